//! Error types for step execution failures.

use stepbind_patterns::StepDefinitionType;
use thiserror::Error;

use crate::binding::HookType;
use crate::converter::ConversionError;
use crate::invoker::InvocationError;
use crate::matcher::AmbiguityReason;

/// Failure to execute a step or hook.
///
/// Messages name the step text and, where several bindings are involved,
/// every candidate binding, so binding authors can see which declarations
/// conflict.
///
/// # Examples
///
/// ```
/// use stepbind::{ExecutionError, StepDefinitionType};
///
/// let error = ExecutionError::Undefined {
///     step_type: StepDefinitionType::Given,
///     text: "a missing step".into(),
/// };
/// assert!(error.is_undefined());
/// assert_eq!(error.to_string(), "no step definition matches Given 'a missing step'");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// No binding matches the step.
    #[error("no step definition matches {step_type} '{text}'")]
    Undefined {
        /// Effective step type.
        step_type: StepDefinitionType,
        /// Step text.
        text: String,
    },
    /// Several bindings match equally well.
    #[error("{reason} {step_type} '{text}': {}", .candidates.join("; "))]
    Ambiguous {
        /// Effective step type.
        step_type: StepDefinitionType,
        /// Step text.
        text: String,
        /// Why the tie could not be broken.
        reason: AmbiguityReason,
        /// Every tied binding.
        candidates: Vec<String>,
    },
    /// Bindings match the text but their scopes exclude the step.
    #[error(
        "step definitions for {step_type} '{text}' exist but none is in scope: {}",
        .candidates.join("; ")
    )]
    ScopeExcluded {
        /// Effective step type.
        step_type: StepDefinitionType,
        /// Step text.
        text: String,
        /// Out-of-scope bindings.
        candidates: Vec<String>,
    },
    /// An argument could not be converted to its parameter type.
    #[error("argument {index} ({parameter}) of '{text}': {source}")]
    Conversion {
        /// Step text.
        text: String,
        /// Zero-based argument position.
        index: usize,
        /// Parameter name.
        parameter: String,
        /// Conversion failure.
        #[source]
        source: ConversionError,
    },
    /// The step body failed or rejected its arguments.
    #[error("step '{text}' failed: {source}")]
    HandlerFailed {
        /// Step text.
        text: String,
        /// Invocation failure carrying the body's error.
        #[source]
        source: InvocationError,
    },
    /// The matched binding is obsolete and obsolete steps are errors.
    #[error("step '{text}' uses {binding}, which is {}", obsoletion_text(.message.as_deref()))]
    Obsolete {
        /// Step text.
        text: String,
        /// Obsolete binding.
        binding: String,
        /// Obsoletion message.
        message: Option<String>,
    },
    /// A hook failed.
    #[error("{hook_type} hook {hook} failed: {source}")]
    HookFailed {
        /// Lifecycle point.
        hook_type: HookType,
        /// Hook method.
        hook: String,
        /// Invocation failure carrying the hook's error.
        #[source]
        source: InvocationError,
    },
}

fn obsoletion_text(message: Option<&str>) -> String {
    message.map_or_else(|| "obsolete".to_string(), |message| format!("obsolete: {message}"))
}

impl ExecutionError {
    /// Returns `true` when no binding matched.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined { .. } | Self::ScopeExcluded { .. })
    }

    /// Bindings named by the error.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        match self {
            Self::Ambiguous { candidates, .. } | Self::ScopeExcluded { candidates, .. } => {
                candidates
            }
            _ => &[],
        }
    }
}
