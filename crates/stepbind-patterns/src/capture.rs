//! Regex capture helpers returning argument values with their offsets.

use regex::{Captures, Regex};

/// One argument captured from step text.
///
/// `start` is the character offset of the value within the step text, or
/// `None` when the group did not participate in the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedArgument {
    /// Captured text; empty for non-participating groups.
    pub value: String,
    /// Zero-based character offset of the value in the step text.
    pub start: Option<usize>,
}

impl CapturedArgument {
    /// Construct an argument from a value and an optional offset.
    #[must_use]
    pub fn new(value: impl Into<String>, start: Option<usize>) -> Self {
        Self {
            value: value.into(),
            start,
        }
    }
}

/// Extract the capture groups when `re` matches the whole of `text`,
/// returning `None` otherwise.
///
/// Capture group 0 (the full match) is ignored so only user-defined groups
/// contribute to the result, and optional groups that do not participate yield
/// empty strings to keep positional alignment.
///
/// # Examples
/// ```
/// # use regex::Regex;
/// # use stepbind_patterns::extract_captured_values;
/// let regex = Regex::new(r"^(\d+)-(\w+)$")
///     .expect("example ensures fallible call succeeds");
/// let values = extract_captured_values(&regex, "42-answer")
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(values, vec!["42".to_string(), "answer".to_string()]);
/// ```
#[must_use]
pub fn extract_captured_values(re: &Regex, text: &str) -> Option<Vec<String>> {
    extract_captures(re, text).map(|args| args.into_iter().map(|arg| arg.value).collect())
}

/// Extract every capture group with its character offset when `re` matches
/// the whole of `text`.
///
/// A match that leaves any part of `text` unconsumed is rejected, even when
/// the regex itself is unanchored.
///
/// # Examples
/// ```
/// # use regex::Regex;
/// # use stepbind_patterns::{CapturedArgument, extract_captures};
/// let regex = Regex::new(r"I add (\d+) and (\d+)")
///     .expect("example ensures fallible call succeeds");
/// let args = extract_captures(&regex, "I add 2 and 3")
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(args[1], CapturedArgument::new("3", Some(12)));
/// assert!(extract_captures(&regex, "I add 2 and 3 today").is_none());
/// ```
#[must_use]
pub fn extract_captures(re: &Regex, text: &str) -> Option<Vec<CapturedArgument>> {
    let caps = whole_text_captures(re, text)?;
    Some(
        (1..caps.len())
            .map(|index| captured_group(&caps, text, index))
            .collect(),
    )
}

/// Extract one argument per slot, where each slot lists the capture groups
/// that may carry its value.
///
/// The first participating group in a slot supplies the value. This supports
/// parameters whose regex offers alternative groups, such as single- or
/// double-quoted strings.
#[must_use]
pub fn extract_slot_captures(
    re: &Regex,
    text: &str,
    slots: &[Vec<usize>],
) -> Option<Vec<CapturedArgument>> {
    let caps = whole_text_captures(re, text)?;
    let values = slots
        .iter()
        .map(|groups| {
            groups
                .iter()
                .find(|index| caps.get(**index).is_some())
                .map_or_else(
                    || CapturedArgument::new(String::new(), None),
                    |index| captured_group(&caps, text, *index),
                )
        })
        .collect();
    Some(values)
}

fn whole_text_captures<'t>(re: &Regex, text: &'t str) -> Option<Captures<'t>> {
    let caps = re.captures(text)?;
    let whole = caps.get(0)?;
    (whole.start() == 0 && whole.end() == text.len()).then_some(caps)
}

fn captured_group(caps: &Captures<'_>, text: &str, index: usize) -> CapturedArgument {
    caps.get(index).map_or_else(
        || CapturedArgument::new(String::new(), None),
        |m| {
            let offset = text.get(..m.start()).map(|prefix| prefix.chars().count());
            CapturedArgument::new(m.as_str(), offset)
        },
    )
}
