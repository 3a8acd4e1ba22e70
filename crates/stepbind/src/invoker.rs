//! Running binding bodies.
//!
//! Invokers receive already-converted arguments. The default invoker runs
//! sync bodies in place and awaits async ones, timing the call; the dry-run
//! invoker never touches user code. Failures from user code are returned
//! unmodified inside [`InvocationError::Failed`]; panics are not caught.

use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use thiserror::Error;

use crate::context::InvocationContext;
use crate::method::{BindingBody, BindingFailure, BindingMethod};
use crate::value::{BindingArguments, StepValue};

/// Outcome of a successful invocation.
#[derive(Debug)]
pub struct Invocation {
    /// Value returned by the body, if any.
    pub value: Option<StepValue>,
    /// Wall-clock time spent in the body.
    pub duration: Duration,
}

/// Failure to invoke a binding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvocationError {
    /// The number of arguments differs from the declared parameters.
    #[error("{method} expects {expected} arguments but received {actual}")]
    ArgumentMismatch {
        /// Method signature.
        method: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },
    /// The body returned an error.
    #[error("{method} failed: {source}")]
    Failed {
        /// Method signature.
        method: String,
        /// Error returned by the body.
        #[source]
        source: BindingFailure,
        /// Time spent before the failure.
        duration: Duration,
    },
}

impl InvocationError {
    /// Time spent in the body before it failed; zero when it never ran.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match self {
            Self::Failed { duration, .. } => *duration,
            Self::ArgumentMismatch { .. } => Duration::ZERO,
        }
    }

    /// Unwrap the error returned by user code.
    #[must_use]
    pub fn into_source(self) -> Option<BindingFailure> {
        match self {
            Self::Failed { source, .. } => Some(source),
            Self::ArgumentMismatch { .. } => None,
        }
    }
}

/// Executes binding methods with converted arguments.
pub trait BindingInvoker: Send + Sync {
    /// Invoke `method`, awaiting asynchronous bodies.
    fn invoke<'a>(
        &'a self,
        method: &'a BindingMethod,
        ctx: &'a mut InvocationContext,
        arguments: Vec<StepValue>,
    ) -> LocalBoxFuture<'a, Result<Invocation, InvocationError>>;

    /// Invoke `method`, blocking the current thread on asynchronous bodies.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when the arguments do not fit the method
    /// or its body fails.
    fn invoke_blocking(
        &self,
        method: &BindingMethod,
        ctx: &mut InvocationContext,
        arguments: Vec<StepValue>,
    ) -> Result<Invocation, InvocationError> {
        futures::executor::block_on(self.invoke(method, ctx, arguments))
    }
}

fn check_arity(method: &BindingMethod, arguments: &[StepValue]) -> Result<(), InvocationError> {
    let expected = method.parameters().len();
    if arguments.len() == expected {
        Ok(())
    } else {
        Err(InvocationError::ArgumentMismatch {
            method: method.to_string(),
            expected,
            actual: arguments.len(),
        })
    }
}

/// Runs binding bodies and measures their duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBindingInvoker;

impl BindingInvoker for DefaultBindingInvoker {
    fn invoke<'a>(
        &'a self,
        method: &'a BindingMethod,
        ctx: &'a mut InvocationContext,
        arguments: Vec<StepValue>,
    ) -> LocalBoxFuture<'a, Result<Invocation, InvocationError>> {
        async move {
            check_arity(method, &arguments)?;
            let args = BindingArguments::from(arguments);
            let started = Instant::now();
            let result = match method.body() {
                BindingBody::Sync(body) => body(ctx, args),
                BindingBody::Async(body) => body(ctx, args).await,
            };
            let duration = started.elapsed();
            result
                .map(|value| Invocation { value, duration })
                .map_err(|source| InvocationError::Failed {
                    method: method.to_string(),
                    source,
                    duration,
                })
        }
        .boxed_local()
    }
}

/// Validates arguments without running any binding body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunBindingInvoker;

impl BindingInvoker for DryRunBindingInvoker {
    fn invoke<'a>(
        &'a self,
        _method: &'a BindingMethod,
        _ctx: &'a mut InvocationContext,
        _arguments: Vec<StepValue>,
    ) -> LocalBoxFuture<'a, Result<Invocation, InvocationError>> {
        futures::future::ready(Ok(Invocation {
            value: None,
            duration: Duration::ZERO,
        }))
        .boxed_local()
    }
}
