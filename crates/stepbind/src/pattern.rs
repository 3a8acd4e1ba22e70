//! Compiled step text patterns.

use std::fmt;

use regex::Regex;
use stepbind_patterns::{
    CapturedArgument, CucumberExpression, ExpressionKind, ParameterTypeLookup, PatternError,
    compile_anchored, compile_method_name_pattern, extract_captures,
};

/// The matcher behind a step definition, compiled once at discovery time.
///
/// Every variant matches whole step texts only and yields one argument per
/// capture group or expression parameter, in declaration order.
///
/// # Examples
///
/// ```
/// use stepbind::StepTextPattern;
///
/// let pattern = StepTextPattern::regex(r"I add (\d+) and (\d+)")?;
/// let args = pattern.captures("I add 2 and 3").expect("step should match");
/// assert_eq!(args[1].value, "3");
/// assert!(pattern.captures("I add 2 and 3 today").is_none());
/// # Ok::<(), stepbind::PatternError>(())
/// ```
#[derive(Debug, Clone)]
pub enum StepTextPattern {
    /// A user regex, anchored to the whole text.
    Regex {
        /// Regex as declared.
        source: String,
        /// Anchored compiled form.
        regex: Regex,
    },
    /// A compiled Cucumber Expression.
    CucumberExpression(CucumberExpression),
    /// A regex synthesised from the method name.
    MethodName {
        /// Method name the regex was derived from.
        method: String,
        /// Compiled case-insensitive regex.
        regex: Regex,
    },
}

impl StepTextPattern {
    /// Compile a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Regex`] when the source is not a valid regex.
    pub fn regex(source: &str) -> Result<Self, PatternError> {
        Ok(Self::Regex {
            source: source.to_string(),
            regex: compile_anchored(source)?,
        })
    }

    /// Compile a Cucumber Expression.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for malformed expressions and unknown
    /// parameter types.
    pub fn cucumber_expression(
        source: &str,
        parameter_types: &dyn ParameterTypeLookup,
    ) -> Result<Self, PatternError> {
        CucumberExpression::compile(source, parameter_types).map(Self::CucumberExpression)
    }

    /// Derive a pattern from a method name and its parameter names.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Regex`] when the synthesised regex is too
    /// large.
    pub fn method_name(method: &str, parameter_names: &[&str]) -> Result<Self, PatternError> {
        Ok(Self::MethodName {
            method: method.to_string(),
            regex: compile_method_name_pattern(method, parameter_names)?,
        })
    }

    /// Pattern language.
    #[must_use]
    pub const fn kind(&self) -> ExpressionKind {
        match self {
            Self::Regex { .. } => ExpressionKind::RegularExpression,
            Self::CucumberExpression(_) => ExpressionKind::CucumberExpression,
            Self::MethodName { .. } => ExpressionKind::MethodName,
        }
    }

    /// Pattern text as declared, or the method name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Regex { source, .. } => source,
            Self::CucumberExpression(expression) => expression.as_str(),
            Self::MethodName { method, .. } => method,
        }
    }

    /// Compiled regex.
    #[must_use]
    pub fn compiled(&self) -> &Regex {
        match self {
            Self::Regex { regex, .. } | Self::MethodName { regex, .. } => regex,
            Self::CucumberExpression(expression) => expression.regex(),
        }
    }

    /// Literal text every matching step starts with, when known.
    #[must_use]
    pub fn literal_prefix(&self) -> Option<&str> {
        match self {
            Self::CucumberExpression(expression) => {
                Some(expression.literal_prefix()).filter(|prefix| !prefix.is_empty())
            }
            Self::Regex { .. } | Self::MethodName { .. } => None,
        }
    }

    /// Match the whole of `text`, returning the arguments with their
    /// character offsets.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<CapturedArgument>> {
        match self {
            Self::Regex { regex, .. } | Self::MethodName { regex, .. } => {
                extract_captures(regex, text)
            }
            Self::CucumberExpression(expression) => expression.captures(text),
        }
    }
}

impl fmt::Display for StepTextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepbind_patterns::StandardParameterTypes;

    #[test]
    fn method_name_patterns_ignore_case() {
        let Ok(pattern) = StepTextPattern::method_name("when_i_press_add", &[]) else {
            panic!("pattern should compile");
        };
        assert_eq!(pattern.kind(), ExpressionKind::MethodName);
        assert!(pattern.captures("I PRESS add").is_some());
        assert_eq!(pattern.literal_prefix(), None);
    }

    #[test]
    fn expressions_expose_literal_prefix() {
        let Ok(pattern) =
            StepTextPattern::cucumber_expression("I have {int} cukes", &StandardParameterTypes)
        else {
            panic!("expression should compile");
        };
        assert_eq!(pattern.literal_prefix(), Some("I have "));
        assert_eq!(pattern.to_string(), "cucumber-expression 'I have {int} cukes'");
    }

    #[test]
    fn regex_errors_surface() {
        assert!(StepTextPattern::regex("(unclosed").is_err());
    }
}
