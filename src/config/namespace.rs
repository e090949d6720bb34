//! Environment namespace matching.
//!
//! An environment variable suffix such as `LOGS_CONFIG_BATCH_WAIT` does not
//! say how deep its key is nested. [`namespaces`] lists every way to read it
//! as `prefix` (a key at the current level) plus `suffix` (the rest, to be
//! resolved one level further down).

/// Candidate `(prefix, suffix)` splits of `name`, least specific first.
///
/// The list starts with `("", name)`, continues with a split at each
/// underscore from left to right and ends with `(name, "")`. Both halves
/// borrow from `name`.
///
/// ```
/// use agent_config::config::namespaces;
///
/// assert_eq!(
///     namespaces("A_B_C"),
///     vec![("", "A_B_C"), ("A", "B_C"), ("A_B", "C"), ("A_B_C", "")]
/// );
/// ```
pub fn namespaces(name: &str) -> Vec<(&str, &str)> {
    if name.is_empty() {
        return vec![("", "")];
    }

    let mut candidates = Vec::with_capacity(name.matches('_').count() + 2);
    candidates.push(("", name));
    for (idx, _) in name.match_indices('_') {
        candidates.push((&name[..idx], &name[idx + 1..]));
    }
    candidates.push((name, ""));
    candidates
}
