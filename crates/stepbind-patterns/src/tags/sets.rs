//! Normalises and combines tag sets so scope evaluation remains deterministic
//! regardless of how scenario, rule and feature tags were written.

use std::collections::HashSet;

/// Return `tag` trimmed and carrying exactly one leading `@`.
///
/// # Examples
/// ```
/// use stepbind_patterns::normalise_tag;
/// assert_eq!(normalise_tag(" wip "), "@wip");
/// assert_eq!(normalise_tag("@wip"), "@wip");
/// ```
#[must_use]
pub fn normalise_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{trimmed}")
    }
}

/// Merge tag sets, preserving first-seen order and de-duplicating values.
///
/// The returned collection always uses `@tag` formatting.
///
/// # Examples
///
/// ```
/// use stepbind_patterns::merge_tag_sets;
/// let feature = vec!["@fast".to_string(), "slow".to_string()];
/// let scenario = vec!["@fast".to_string(), "web".to_string()];
/// let merged = merge_tag_sets([feature.as_slice(), scenario.as_slice()]);
/// assert_eq!(merged, vec!["@fast", "@slow", "@web"]);
/// ```
pub fn merge_tag_sets<'a, I>(sets: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for tag in sets.into_iter().flatten() {
        let formatted = normalise_tag(tag);
        if seen.insert(formatted.clone()) {
            merged.push(formatted);
        }
    }
    merged
}
