//! Type-erased values flowing between matching, conversion and invocation.
//!
//! Raw step arguments start life as text, doc strings or tables. Conversion
//! turns them into [`StepValue`]s of the exact parameter type, and binding
//! bodies receive them positionally through [`BindingArguments`].

use std::any::{Any, TypeId};
use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

use crate::binding_type::short_type_name;
use crate::datatable::DataTable;

/// A boxed value of any `'static` type, tagged with its type name for
/// diagnostics.
///
/// # Examples
///
/// ```
/// use stepbind::StepValue;
///
/// let value = StepValue::new(42_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.type_name(), "i32");
/// assert_eq!(value.downcast::<i32>().ok(), Some(42));
/// ```
pub struct StepValue {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl StepValue {
    /// Box `value`.
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Return `true` when the value holds a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrow the value as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the value as `T`, returning `self` unchanged on mismatch.
    ///
    /// # Errors
    /// Returns the original value when it does not hold a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|value| Self { value, type_name })
    }

    /// Runtime type identifier of the held value.
    #[must_use]
    pub fn value_type_id(&self) -> TypeId {
        self.value.as_ref().type_id()
    }

    /// Short type name of the held value, without module paths.
    #[must_use]
    pub fn type_name(&self) -> String {
        short_type_name(self.type_name)
    }

    /// Borrow the value as text when it holds a `String`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.downcast_ref::<String>().map(String::as_str)
    }

    /// Return `true` when the value holds a [`DataTable`].
    #[must_use]
    pub fn is_table(&self) -> bool {
        self.is::<DataTable>()
    }
}

impl fmt::Debug for StepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.as_text() {
            return write!(f, "StepValue({text:?})");
        }
        write!(f, "StepValue(<{}>)", self.type_name())
    }
}

/// Raw step argument before type conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepArgument {
    /// Text captured from the step line by the step pattern.
    Text(String),
    /// Multi-line doc string attached to the step.
    DocString(String),
    /// Data table attached to the step.
    Table(DataTable),
}

impl StepArgument {
    /// Return `true` for doc strings and tables.
    #[must_use]
    pub fn is_multiline(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    /// Text content for captures and doc strings.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::DocString(text) => Some(text),
            Self::Table(_) => None,
        }
    }

    /// Box the argument for conversion. Text and doc strings become
    /// `String` values; tables stay tables.
    #[must_use]
    pub fn into_value(self) -> StepValue {
        match self {
            Self::Text(text) | Self::DocString(text) => StepValue::new(text),
            Self::Table(table) => StepValue::new(table),
        }
    }
}

impl fmt::Display for StepArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::DocString(text) => write!(f, "doc string ({} chars)", text.chars().count()),
            Self::Table(table) => write!(f, "table ({} rows)", table.raw_rows().len()),
        }
    }
}

/// Error raised when a binding body reads its arguments incorrectly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    /// The body asked for more arguments than were supplied.
    #[error("argument {index} is missing")]
    Missing {
        /// Zero-based argument position.
        index: usize,
    },
    /// The argument holds a different type.
    #[error("argument {index} holds {actual}, not {expected}")]
    TypeMismatch {
        /// Zero-based argument position.
        index: usize,
        /// Requested type.
        expected: String,
        /// Type actually held.
        actual: String,
    },
}

/// Converted arguments handed to a binding body in parameter order.
///
/// # Examples
///
/// ```
/// use stepbind::{BindingArguments, StepValue};
///
/// let mut args = BindingArguments::from(vec![StepValue::new(2_i32), StepValue::new(3_i32)]);
/// let lhs: i32 = args.take()?;
/// let rhs: i32 = args.take()?;
/// assert_eq!(lhs + rhs, 5);
/// # Ok::<(), stepbind::ArgumentError>(())
/// ```
#[derive(Debug, Default)]
pub struct BindingArguments {
    values: VecDeque<StepValue>,
    taken: usize,
}

impl BindingArguments {
    /// Take the next argument as `T`.
    ///
    /// # Errors
    /// Returns [`ArgumentError`] when no argument remains or it holds another
    /// type.
    pub fn take<T: Any>(&mut self) -> Result<T, ArgumentError> {
        let index = self.taken;
        let value = self
            .values
            .pop_front()
            .ok_or(ArgumentError::Missing { index })?;
        self.taken += 1;
        value.downcast::<T>().map_err(|value| ArgumentError::TypeMismatch {
            index,
            expected: short_type_name(std::any::type_name::<T>()),
            actual: value.type_name(),
        })
    }

    /// Take the next argument without downcasting.
    ///
    /// # Errors
    /// Returns [`ArgumentError::Missing`] when no argument remains.
    pub fn take_value(&mut self) -> Result<StepValue, ArgumentError> {
        let index = self.taken;
        let value = self
            .values
            .pop_front()
            .ok_or(ArgumentError::Missing { index })?;
        self.taken += 1;
        Ok(value)
    }

    /// Number of arguments not yet taken.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl From<Vec<StepValue>> for BindingArguments {
    fn from(values: Vec<StepValue>) -> Self {
        Self {
            values: values.into(),
            taken: 0,
        }
    }
}
