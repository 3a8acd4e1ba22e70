//! Abstract syntax tree and evaluation helpers for tag expressions.
//!
//! Tag expressions recognise tags (`@tag`), unary `not`, binary `and` and `or`,
//! and parentheses for grouping. The parser accepts nested combinations such as
//! `@fast and (not @wip or @nightly)`.
//!
//! Precedence follows Gherkin conventions: `not` binds tighter than `and`,
//! which in turn binds tighter than `or`. Operators associate to the left, so
//! `@a or @b and @c` is parsed as `@a or (@b and @c)` while chaining `and`
//! operations without parentheses still groups them left-to-right.
//!
//! Evaluation consumes the available tag set (retaining the leading `@`) and
//! applies short-circuit semantics to mirror the parser structure.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use super::parser::Parser;
use super::sets::normalise_tag;

/// Parsed representation of a tag expression.
///
/// # Examples
/// ```
/// use stepbind_patterns::TagExpression;
/// let expr = TagExpression::parse("@fast and not @wip").expect("valid expression");
/// assert!(expr.evaluate(["@fast"]));
/// assert!(!expr.evaluate(["@fast", "@wip"]));
/// ```
#[derive(Clone, Debug)]
pub struct TagExpression {
    source: String,
    root: Expr,
}

#[derive(Clone, Debug)]
pub(super) enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Error raised when a tag expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tag expression at byte {offset}: {reason}")]
pub struct TagExprError {
    offset: usize,
    reason: String,
}

impl TagExprError {
    pub(super) fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }

    /// Byte offset of the failure within the expression.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl TagExpression {
    /// Parse a tag expression.
    ///
    /// A single bare tag name such as `checkout` is accepted as shorthand for
    /// `@checkout`.
    ///
    /// # Errors
    /// Returns [`TagExprError`] describing the first syntax problem.
    pub fn parse(input: &str) -> Result<Self, TagExprError> {
        let trimmed = input.trim();
        let shorthand = !trimmed.is_empty()
            && !trimmed.starts_with('@')
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
            && !matches!(trimmed.to_ascii_lowercase().as_str(), "and" | "or" | "not");
        let source = if shorthand {
            normalise_tag(trimmed)
        } else {
            input.to_string()
        };
        let mut parser = Parser::new(&source)?;
        let root = parser.parse_expression()?;
        parser.expect_end()?;
        Ok(Self { source, root })
    }

    /// Evaluate the expression against the tags in effect.
    ///
    /// Tags are compared with their leading `@`.
    pub fn evaluate<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let set: HashSet<&'a str> = tags.into_iter().collect();
        self.root.eval(&set)
    }

    /// Normalised source text of the expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for TagExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Expr {
    pub(super) fn eval(&self, tags: &HashSet<&str>) -> bool {
        match self {
            Self::Tag(tag) => tags.contains(tag.as_str()),
            Self::Not(inner) => !inner.eval(tags),
            Self::And(lhs, rhs) => lhs.eval(tags) && rhs.eval(tags),
            Self::Or(lhs, rhs) => lhs.eval(tags) || rhs.eval(tags),
        }
    }
}
