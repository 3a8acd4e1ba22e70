//! Errors raised while converting step arguments.

use thiserror::Error;

use crate::invoker::InvocationError;

/// Failure to produce a value of a parameter's declared type.
///
/// The first four variants are the "cannot convert" family:
/// [`can_convert`](super::StepArgumentTypeConverter::can_convert) reports
/// them as `false`, while
/// [`convert`](super::StepArgumentTypeConverter::convert) returns them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConversionError {
    /// The value's type has no conversion to the target type.
    #[error("cannot convert a value of type {value_type} to {target}")]
    InvalidCast {
        /// Type of the value being converted.
        value_type: String,
        /// Requested type.
        target: String,
    },
    /// The text is numeric but does not fit the target type.
    #[error("'{value}' is out of range for {target}")]
    Overflow {
        /// Offending text.
        value: String,
        /// Requested type.
        target: String,
    },
    /// The text is not in a format the target type accepts.
    #[error("'{value}' is not a valid {target}")]
    Format {
        /// Offending text.
        value: String,
        /// Requested type.
        target: String,
    },
    /// The text names no member of the target enum.
    #[error("'{value}' is not a member of {target} (expected one of: {expected})")]
    Argument {
        /// Offending text.
        value: String,
        /// Requested enum type.
        target: String,
        /// Comma-separated member names.
        expected: String,
    },
    /// The target type is only known by name and cannot be constructed.
    #[error("type {target} is not a runtime type; only runtime types can be converted")]
    NonRuntimeType {
        /// Requested type.
        target: String,
    },
    /// A transformation was about to be applied while already in the chain.
    #[error("transformation cycle detected converting to {target}: {chain}")]
    TransformationCycle {
        /// Requested type.
        target: String,
        /// Transformations applied so far, outermost first, joined by ` -> `.
        chain: String,
    },
    /// Nested transformations exceeded the configured depth.
    #[error("transformation depth limit of {limit} exceeded converting to {target}")]
    DepthExceeded {
        /// Requested type.
        target: String,
        /// Configured maximum depth.
        limit: usize,
    },
    /// The transformation body failed.
    #[error("transformation {transformation} failed: {source}")]
    TransformationFailed {
        /// Transformation method name.
        transformation: String,
        /// Invocation failure.
        #[source]
        source: InvocationError,
    },
    /// The transformation returned nothing or a value of another type.
    #[error("transformation {transformation} returned {actual}, expected {target}")]
    UnexpectedResult {
        /// Transformation method name.
        transformation: String,
        /// Declared output type.
        target: String,
        /// Type actually returned, or `nothing`.
        actual: String,
    },
    /// The transformation regex captured a different number of groups than
    /// the method declares parameters.
    #[error(
        "transformation {transformation} declares {expected} parameters but its regex \
         captured {actual} values"
    )]
    ArgumentCount {
        /// Transformation method name.
        transformation: String,
        /// Declared parameter count.
        expected: usize,
        /// Captured value count.
        actual: usize,
    },
}

impl ConversionError {
    /// Returns `true` for failures a conversion probe treats as "cannot
    /// convert" rather than as hard errors.
    #[must_use]
    pub const fn is_conversion_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCast { .. }
                | Self::Overflow { .. }
                | Self::Format { .. }
                | Self::Argument { .. }
        )
    }

    pub(crate) fn format(value: &str, target: &str) -> Self {
        Self::Format {
            value: value.to_string(),
            target: target.to_string(),
        }
    }
}
