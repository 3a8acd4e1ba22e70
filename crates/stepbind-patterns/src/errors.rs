//! Errors raised while compiling step expressions.

use std::fmt;

use thiserror::Error;

/// Where and why a Cucumber Expression failed to parse.
///
/// # Examples
/// ```
/// use stepbind_patterns::SyntaxErrorInfo;
///
/// let info = SyntaxErrorInfo::new("undefined parameter type", 6, Some("colour".into()));
/// assert_eq!(info.to_string(), "undefined parameter type `{colour}` at byte 6");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// What went wrong.
    pub message: &'static str,
    /// Byte offset into the expression source.
    pub position: usize,
    /// Parameter type name, when the failure concerns one.
    pub parameter: Option<String>,
}

impl SyntaxErrorInfo {
    /// Describe a syntax failure.
    #[must_use]
    pub fn new(message: &'static str, position: usize, parameter: Option<String>) -> Self {
        Self {
            message,
            position,
            parameter,
        }
    }
}

impl fmt::Display for SyntaxErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)?;
        if let Some(name) = &self.parameter {
            write!(f, " `{{{name}}}`")?;
        }
        write!(f, " at byte {}", self.position)
    }
}

/// Failure to turn a step expression into a regex.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// The Cucumber Expression is malformed.
    #[error("{0}")]
    Syntax(SyntaxErrorInfo),
    /// The resulting regex does not compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl PatternError {
    /// Byte offset of a syntax error; `None` for regex failures.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Syntax(info) => Some(info.position),
            Self::Regex(_) => None,
        }
    }
}

pub(crate) fn syntax_error(
    message: &'static str,
    position: usize,
    parameter: Option<String>,
) -> PatternError {
    PatternError::Syntax(SyntaxErrorInfo::new(message, position, parameter))
}
