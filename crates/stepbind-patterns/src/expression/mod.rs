//! Cucumber Expression lexing, parsing and compilation.
//!
//! Expressions such as `I have {int} cuke(s)` compile into anchored regexes.
//! Parameter types are resolved through a [`ParameterTypeLookup`] so callers
//! can layer custom types over the [`StandardParameterTypes`].

mod compiler;
mod lexer;
mod parser;

use regex::Regex;

use crate::capture::{CapturedArgument, extract_slot_captures};
use crate::errors::PatternError;

pub use compiler::{CompiledParameter, ExpressionRegex, build_expression_regex};

/// Regex matching integers for `{int}` and friends.
pub const INT_REGEX: &str = r"-?\d+";
/// Regex matching decimal numbers for `{float}` and friends.
pub const FLOAT_REGEX: &str = r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?";
/// Regex matching a single whitespace-free word for `{word}`.
pub const WORD_REGEX: &str = r"[^\s]+";
/// Regex matching anything, used by `{}` and type-named parameters.
pub const MATCH_ALL_REGEX: &str = ".*";

/// Regex shape a parameter type contributes to a compiled expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterRegex {
    /// A single regex whose whole match is the parameter value.
    Pattern(String),
    /// A single- or double-quoted string; the value excludes the quotes.
    QuotedString,
}

/// Resolve parameter type names to their regex shape.
pub trait ParameterTypeLookup {
    /// Return the regex shape for `name`, or `None` when the type is unknown.
    fn parameter_regex(&self, name: &str) -> Option<ParameterRegex>;
}

/// The parameter types every Cucumber implementation understands.
///
/// `{int}`, `{byte}`, `{short}`, `{long}`, `{float}`, `{double}`,
/// `{decimal}`, `{word}`, `{string}` and the anonymous `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardParameterTypes;

impl ParameterTypeLookup for StandardParameterTypes {
    fn parameter_regex(&self, name: &str) -> Option<ParameterRegex> {
        let pattern = match name {
            "" => MATCH_ALL_REGEX,
            "int" | "byte" | "short" | "long" => INT_REGEX,
            "float" | "double" | "decimal" => FLOAT_REGEX,
            "word" => WORD_REGEX,
            "string" => return Some(ParameterRegex::QuotedString),
            _ => return None,
        };
        Some(ParameterRegex::Pattern(pattern.to_string()))
    }
}

/// A compiled Cucumber Expression ready for matching.
#[derive(Debug, Clone)]
pub struct CucumberExpression {
    expression: String,
    regex: Regex,
    parameters: Vec<CompiledParameter>,
    literal_prefix: String,
}

impl CucumberExpression {
    /// Compile `expression` using `lookup` for parameter types.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the expression is malformed, names an
    /// unknown parameter type or produces an invalid regex.
    ///
    /// # Examples
    /// ```
    /// # use stepbind_patterns::{CucumberExpression, StandardParameterTypes};
    /// let expr = CucumberExpression::compile("I pay {string}", &StandardParameterTypes)
    ///     .expect("example ensures fallible call succeeds");
    /// let args = expr.captures("I pay \"five\"").expect("step should match");
    /// assert_eq!(args[0].value, "five");
    /// ```
    pub fn compile(
        expression: &str,
        lookup: &dyn ParameterTypeLookup,
    ) -> Result<Self, PatternError> {
        let built = build_expression_regex(expression, lookup)?;
        let regex = Regex::new(&built.source)?;
        Ok(Self {
            expression: expression.to_string(),
            regex,
            parameters: built.parameters,
            literal_prefix: built.literal_prefix,
        })
    }

    /// Original expression text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// Compiled regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[CompiledParameter] {
        &self.parameters
    }

    /// Literal text every matching step starts with.
    #[must_use]
    pub fn literal_prefix(&self) -> &str {
        &self.literal_prefix
    }

    /// Match `text` and return one argument per parameter.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<CapturedArgument>> {
        let slots: Vec<Vec<usize>> = self
            .parameters
            .iter()
            .map(|param| param.groups.clone())
            .collect();
        extract_slot_captures(&self.regex, text, &slots)
    }
}
