//! Whole-text anchoring for user-supplied regular expressions.

use regex::Regex;

use crate::errors::PatternError;

/// Wrap a regex source so it only matches entire step texts.
///
/// Existing leading `^` and trailing `$` anchors are removed before the body
/// is wrapped in a non-capturing group, so top-level alternations cannot
/// escape the anchors. An escaped trailing `\$` is kept as a literal.
///
/// # Examples
/// ```
/// use stepbind_patterns::anchor_regex;
/// assert_eq!(anchor_regex(r"I have (\d+) cukes"), r"^(?:I have (\d+) cukes)$");
/// assert_eq!(anchor_regex(r"^a|b$"), r"^(?:a|b)$");
/// assert_eq!(anchor_regex(r"costs \$"), r"^(?:costs \$)$");
/// ```
#[must_use]
pub fn anchor_regex(source: &str) -> String {
    format!("^(?:{})$", strip_anchors(source))
}

/// Anchor and compile a regex source.
///
/// # Errors
/// Returns [`PatternError::Regex`] when the source is not a valid regex.
pub fn compile_anchored(source: &str) -> Result<Regex, PatternError> {
    Regex::new(&anchor_regex(source)).map_err(PatternError::from)
}

/// Remove the outer anchors from a regex source without wrapping it.
///
/// Used when embedding a transformation regex inside a larger expression.
#[must_use]
pub fn strip_anchors(source: &str) -> &str {
    let body = source.strip_prefix('^').unwrap_or(source);
    match body.strip_suffix('$') {
        Some(stripped) if !ends_with_escape(stripped) => stripped,
        _ => body,
    }
}

fn ends_with_escape(text: &str) -> bool {
    let trailing = text.chars().rev().take_while(|c| *c == '\\').count();
    trailing & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "^(?:plain)$")]
    #[case("^plain$", "^(?:plain)$")]
    #[case("^plain", "^(?:plain)$")]
    #[case(r"ends with \\$", r"^(?:ends with \\)$")]
    #[case(r"costs \$", r"^(?:costs \$)$")]
    fn anchors_sources(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(anchor_regex(input), expected);
    }

    #[test]
    fn anchored_alternation_requires_whole_text() {
        let Ok(re) = compile_anchored("a|b") else {
            panic!("regex should compile");
        };
        assert!(re.is_match("a"));
        assert!(!re.is_match("ab"));
    }

    #[test]
    fn strips_anchors_for_embedding() {
        assert_eq!(strip_anchors(r"^\$(\d+)$"), r"\$(\d+)");
        assert_eq!(strip_anchors("body"), "body");
    }

    #[test]
    fn surfaces_invalid_regex() {
        assert!(matches!(
            compile_anchored("(unclosed"),
            Err(PatternError::Regex(_))
        ));
    }
}
