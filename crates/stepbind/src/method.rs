//! Invokable binding methods.
//!
//! A [`BindingMethod`] is what step definitions, hooks and transformations
//! point at: a name for diagnostics, declared parameter and return types for
//! matching and conversion, optional obsoletion metadata, and the body that
//! runs.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use futures::future::LocalBoxFuture;

use crate::binding_type::{BindableType, BindingType};
use crate::context::InvocationContext;
use crate::value::{BindingArguments, StepValue};

/// Error returned by a binding body.
pub type BindingFailure = Box<dyn StdError + Send + Sync>;

/// Result of a binding body: an optional return value or a failure.
pub type BindingResult = Result<Option<StepValue>, BindingFailure>;

/// Future returned by an asynchronous binding body.
pub type BindingFuture<'a> = LocalBoxFuture<'a, BindingResult>;

type SyncBody = dyn Fn(&mut InvocationContext, BindingArguments) -> BindingResult + Send + Sync;

type AsyncBody =
    dyn for<'a> Fn(&'a mut InvocationContext, BindingArguments) -> BindingFuture<'a> + Send + Sync;

/// The code a binding runs.
#[derive(Clone)]
pub enum BindingBody {
    /// Runs to completion on the calling thread.
    Sync(Arc<SyncBody>),
    /// Returns a future awaited by the invoker.
    Async(Arc<AsyncBody>),
}

impl fmt::Debug for BindingBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sync(_) => "BindingBody::Sync",
            Self::Async(_) => "BindingBody::Async",
        })
    }
}

/// A declared parameter of a binding method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingParameter {
    name: String,
    binding_type: BindingType,
}

impl BindingParameter {
    /// Describe a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, binding_type: BindingType) -> Self {
        Self {
            name: name.into(),
            binding_type,
        }
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub const fn binding_type(&self) -> &BindingType {
        &self.binding_type
    }
}

/// Marks a method as deprecated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Obsoletion {
    message: Option<String>,
}

impl Obsoletion {
    /// Obsoletion with an optional explanation.
    #[must_use]
    pub fn new(message: Option<String>) -> Self {
        Self { message }
    }

    /// Explanation supplied by the binding author.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Obsoletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("obsolete")?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// A named, typed, invokable binding body.
///
/// # Examples
///
/// ```
/// use stepbind::{BindingMethod, BindingType, StepValue};
///
/// let add = BindingMethod::sync("Calculator", "add", |_ctx, mut args| {
///     let lhs: i32 = args.take()?;
///     let rhs: i32 = args.take()?;
///     Ok(Some(StepValue::new(lhs + rhs)))
/// })
/// .with_parameter::<i32>("lhs")
/// .with_parameter::<i32>("rhs")
/// .returning::<i32>();
///
/// assert_eq!(add.to_string(), "Calculator::add(i32, i32)");
/// assert_eq!(add.return_type(), Some(&BindingType::of::<i32>()));
/// ```
#[derive(Debug, Clone)]
pub struct BindingMethod {
    declaring_type: String,
    name: String,
    parameters: Vec<BindingParameter>,
    return_type: Option<BindingType>,
    obsoletion: Option<Obsoletion>,
    body: BindingBody,
}

impl BindingMethod {
    /// Describe a method with no parameters and no return value.
    #[must_use]
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        body: BindingBody,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            obsoletion: None,
            body,
        }
    }

    /// Describe a synchronous method.
    #[must_use]
    pub fn sync<F>(declaring_type: impl Into<String>, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut InvocationContext, BindingArguments) -> BindingResult + Send + Sync + 'static,
    {
        Self::new(declaring_type, name, BindingBody::Sync(Arc::new(body)))
    }

    /// Describe an asynchronous method.
    #[must_use]
    pub fn asynchronous<F>(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        body: F,
    ) -> Self
    where
        F: for<'a> Fn(&'a mut InvocationContext, BindingArguments) -> BindingFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        Self::new(declaring_type, name, BindingBody::Async(Arc::new(body)))
    }

    /// Append a parameter of type `T`.
    #[must_use]
    pub fn with_parameter<T: BindableType>(self, name: impl Into<String>) -> Self {
        self.with_parameter_type(name, BindingType::of::<T>())
    }

    /// Append a parameter with an explicit [`BindingType`].
    #[must_use]
    pub fn with_parameter_type(
        mut self,
        name: impl Into<String>,
        binding_type: BindingType,
    ) -> Self {
        self.parameters.push(BindingParameter::new(name, binding_type));
        self
    }

    /// Declare the return type as `T`.
    #[must_use]
    pub fn returning<T: BindableType>(self) -> Self {
        self.with_return_type(BindingType::of::<T>())
    }

    /// Declare an explicit return type.
    #[must_use]
    pub fn with_return_type(mut self, binding_type: BindingType) -> Self {
        self.return_type = Some(binding_type);
        self
    }

    /// Mark the method obsolete.
    #[must_use]
    pub fn obsolete(mut self, message: Option<&str>) -> Self {
        self.obsoletion = Some(Obsoletion::new(message.map(str::to_string)));
        self
    }

    /// Type or module the method belongs to.
    #[must_use]
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters in order.
    #[must_use]
    pub fn parameters(&self) -> &[BindingParameter] {
        &self.parameters
    }

    /// Declared return type, if any.
    #[must_use]
    pub const fn return_type(&self) -> Option<&BindingType> {
        self.return_type.as_ref()
    }

    /// Obsoletion metadata, if any.
    #[must_use]
    pub const fn obsoletion(&self) -> Option<&Obsoletion> {
        self.obsoletion.as_ref()
    }

    /// The code to run.
    #[must_use]
    pub const fn body(&self) -> &BindingBody {
        &self.body
    }
}

impl fmt::Display for BindingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.declaring_type, self.name)?;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", parameter.binding_type)?;
        }
        f.write_str(")")
    }
}
