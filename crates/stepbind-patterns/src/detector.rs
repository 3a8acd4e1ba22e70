//! Heuristic classification of step definition expressions.
//!
//! Step definition text is ambiguous: `I have 5 cukes` is both a valid regex
//! and a valid Cucumber Expression. The detector sniffs for tell-tale syntax
//! rather than parsing either grammar, and defaults to Cucumber Expressions.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern language of a step definition expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    /// A regular expression matched against the whole step text.
    RegularExpression,
    /// A Cucumber Expression compiled into a regular expression.
    CucumberExpression,
    /// A regex synthesised from the binding method name.
    MethodName,
}

impl ExpressionKind {
    /// Return a short label for diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RegularExpression => "regex",
            Self::CucumberExpression => "cucumber-expression",
            Self::MethodName => "method-name",
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[expect(clippy::expect_used, reason = "constant pattern is known to compile")]
static PARAMETER_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\w*\}").expect("parameter placeholder regex"));

#[expect(clippy::expect_used, reason = "constant pattern is known to compile")]
static COMMON_REGEX_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\([^\)]+[\*\+]\)|\.\*)").expect("common regex syntax regex")
});

#[expect(clippy::expect_used, reason = "constant pattern is known to compile")]
static EXTENDED_REGEX_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\\.|\\d\+)").expect("extended regex syntax regex"));

/// Decide whether step definition text is a Cucumber Expression.
///
/// # Examples
/// ```
/// use stepbind_patterns::is_cucumber_expression;
/// assert!(is_cucumber_expression("I have {int} cukes"));
/// assert!(is_cucumber_expression("I have cukes"));
/// assert!(!is_cucumber_expression(r"^I have (\d+) cukes$"));
/// assert!(!is_cucumber_expression("I have (.*) cukes"));
/// ```
#[must_use]
pub fn is_cucumber_expression(text: &str) -> bool {
    if text.starts_with('^') || text.ends_with('$') {
        return false;
    }
    if PARAMETER_PLACEHOLDER.is_match(text) {
        return true;
    }
    !(COMMON_REGEX_SYNTAX.is_match(text) || EXTENDED_REGEX_SYNTAX.is_match(text))
}

/// Classify step definition text as a regex or a Cucumber Expression.
#[must_use]
pub fn detect_expression_kind(text: &str) -> ExpressionKind {
    if is_cucumber_expression(text) {
        ExpressionKind::CucumberExpression
    } else {
        ExpressionKind::RegularExpression
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("simple expression", true)]
    #[case("I have {int} cucumbers", true)]
    #[case("I have {} cucumbers", true)]
    #[case("anchored at start", true)]
    #[case("^anchored at start", false)]
    #[case("anchored at end$", false)]
    #[case("I have (.*) cucumbers", false)]
    #[case(r"I have (\d+) cucumbers", false)]
    #[case(r"I have ([a-z]+) cucumbers", false)]
    #[case(r"the price is 1\.5", false)]
    #[case("I have (a) cucumber(s)", true)]
    #[case(r"regex (\d+) with {word}", true)]
    fn classifies_expressions(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_cucumber_expression(text), expected, "text: {text}");
    }

    #[test]
    fn maps_to_expression_kind() {
        assert_eq!(
            detect_expression_kind("I press {word}"),
            ExpressionKind::CucumberExpression
        );
        assert_eq!(
            detect_expression_kind("^I press (.*)$"),
            ExpressionKind::RegularExpression
        );
    }
}
