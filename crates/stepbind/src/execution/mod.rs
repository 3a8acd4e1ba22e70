//! Executing matched steps and lifecycle hooks.
//!
//! The executor ties the pieces together: it selects a binding, applies the
//! configured obsolete-step policy, converts each argument to its parameter
//! type and invokes the binding body. Failures are reported as
//! [`ExecutionError`] so the runner can decide whether the scenario fails,
//! is pending or is skipped.

use std::sync::Arc;
use std::time::Duration;

use crate::binding::HookType;
use crate::config::{ObsoleteBehavior, RuntimeConfig};
use crate::context::InvocationContext;
use crate::converter::StepArgumentTypeConverter;
use crate::invoker::{
    BindingInvoker, DefaultBindingInvoker, DryRunBindingInvoker, InvocationError,
};
use crate::matcher::{BindingMatch, BindingMatchEngine, MatchOutcome};
use crate::registry::BindingRegistry;
use crate::scope::ScopeContext;
use crate::step::StepContext;
use crate::value::StepValue;

mod error;

pub use error::ExecutionError;

/// How a step finished when it did not fail.
#[derive(Debug)]
pub enum StepOutcome {
    /// The body ran, or would have run in a dry run.
    Passed {
        /// Time spent in the body.
        duration: Duration,
        /// Value returned by the body.
        value: Option<StepValue>,
    },
    /// The step was not run and should be reported as pending.
    Pending {
        /// Reason shown to the user.
        message: String,
    },
}

impl StepOutcome {
    /// Returns `true` for [`StepOutcome::Passed`].
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Runs steps and hooks against a ready registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use stepbind::{
///     BindingDiscovery, BindingMethod, InvocationContext, RuntimeConfig, StepContext,
///     StepDefinitionDescriptor, StepDefinitionType, StepExecutor, StepValue,
/// };
///
/// let mut discovery = BindingDiscovery::new();
/// discovery.step(StepDefinitionDescriptor::when(
///     Some("I add {int} and {int}"),
///     BindingMethod::sync("Calculator", "add", |ctx, mut args| {
///         let total = args.take::<i32>()? + args.take::<i32>()?;
///         ctx.insert(total);
///         Ok(None)
///     })
///     .with_parameter::<i32>("a")
///     .with_parameter::<i32>("b"),
/// ));
/// let config = RuntimeConfig::default();
/// let executor = StepExecutor::new(Arc::new(discovery.build(&config)), config);
///
/// let mut ctx = InvocationContext::default();
/// let step = StepContext::new(StepDefinitionType::When, "I add 2 and 3");
/// executor.execute_blocking(&mut ctx, &step)?;
/// assert_eq!(ctx.get::<i32>(), Some(&5));
/// # Ok::<(), stepbind::ExecutionError>(())
/// ```
#[derive(Clone)]
pub struct StepExecutor {
    registry: Arc<BindingRegistry>,
    config: RuntimeConfig,
    invoker: Arc<dyn BindingInvoker>,
}

impl std::fmt::Debug for StepExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepExecutor")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StepExecutor {
    /// Create an executor. Dry runs use [`DryRunBindingInvoker`].
    #[must_use]
    pub fn new(registry: Arc<BindingRegistry>, config: RuntimeConfig) -> Self {
        let invoker: Arc<dyn BindingInvoker> = if config.dry_run() {
            Arc::new(DryRunBindingInvoker)
        } else {
            Arc::new(DefaultBindingInvoker)
        };
        Self {
            registry,
            config,
            invoker,
        }
    }

    /// Replace the invoker.
    #[must_use]
    pub fn with_invoker(mut self, invoker: Arc<dyn BindingInvoker>) -> Self {
        self.invoker = invoker;
        self
    }

    /// The registry steps are matched against.
    #[must_use]
    pub const fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    fn converter(&self) -> StepArgumentTypeConverter<'_> {
        StepArgumentTypeConverter::new(&self.registry, self.invoker.as_ref())
            .with_max_depth(self.config.max_transformation_depth())
    }

    /// Select the binding for `step`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Undefined`], [`ExecutionError::ScopeExcluded`]
    /// or [`ExecutionError::Ambiguous`] when no single binding applies.
    pub fn find_match(&self, step: &StepContext) -> Result<BindingMatch, ExecutionError> {
        let outcome =
            BindingMatchEngine::new(&self.registry).get_best_match(step, self.config.culture());
        match outcome {
            MatchOutcome::Matched(found) => Ok(found),
            MatchOutcome::Ambiguous { reason, candidates } => Err(ExecutionError::Ambiguous {
                step_type: step.step_type(),
                text: step.text().to_string(),
                reason,
                candidates: describe(&candidates),
            }),
            MatchOutcome::NoMatch {
                scope_excluded: true,
                candidates,
            } => Err(ExecutionError::ScopeExcluded {
                step_type: step.step_type(),
                text: step.text().to_string(),
                candidates: describe(&candidates),
            }),
            MatchOutcome::NoMatch { .. } => Err(ExecutionError::Undefined {
                step_type: step.step_type(),
                text: step.text().to_string(),
            }),
        }
    }

    /// Match, convert and invoke `step`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when matching fails, an argument cannot be
    /// converted, the binding is obsolete under
    /// [`ObsoleteBehavior::Error`], or the body fails.
    pub async fn execute(
        &self,
        ctx: &mut InvocationContext,
        step: &StepContext,
    ) -> Result<StepOutcome, ExecutionError> {
        let found = self.find_match(step)?;
        let Some(binding) = found.binding().cloned() else {
            return Err(ExecutionError::Undefined {
                step_type: step.step_type(),
                text: step.text().to_string(),
            });
        };
        if let Some(obsoletion) = found.obsoletion() {
            match self.config.obsolete_behavior() {
                ObsoleteBehavior::None => {}
                ObsoleteBehavior::Warn => {
                    log::warn!("step '{}' uses {binding}, which is {obsoletion}", step.text());
                }
                ObsoleteBehavior::Pending => {
                    return Ok(StepOutcome::Pending {
                        message: format!("{} is {obsoletion}", binding.method()),
                    });
                }
                ObsoleteBehavior::Error => {
                    return Err(ExecutionError::Obsolete {
                        text: step.text().to_string(),
                        binding: binding.to_string(),
                        message: obsoletion.message().map(str::to_string),
                    });
                }
            }
        }
        if self.config.dry_run() {
            log::debug!("dry run: skipping '{}' bound to {binding}", step.text());
            return Ok(StepOutcome::Passed {
                duration: Duration::ZERO,
                value: None,
            });
        }

        let method = binding.method();
        let arguments = found.into_arguments();
        if arguments.len() != method.parameters().len() {
            return Err(ExecutionError::HandlerFailed {
                text: step.text().to_string(),
                source: InvocationError::ArgumentMismatch {
                    method: method.to_string(),
                    expected: method.parameters().len(),
                    actual: arguments.len(),
                },
            });
        }
        let converter = self.converter();
        let mut values = Vec::with_capacity(arguments.len());
        for (index, (argument, parameter)) in
            arguments.into_iter().zip(method.parameters()).enumerate()
        {
            let value = converter
                .convert(
                    argument.value.into_value(),
                    parameter.binding_type(),
                    ctx,
                    self.config.culture(),
                )
                .await
                .map_err(|source| ExecutionError::Conversion {
                    text: step.text().to_string(),
                    index,
                    parameter: parameter.name().to_string(),
                    source,
                })?;
            values.push(value);
        }
        let invocation = self
            .invoker
            .invoke(method, ctx, values)
            .await
            .map_err(|source| ExecutionError::HandlerFailed {
                text: step.text().to_string(),
                source,
            })?;
        Ok(StepOutcome::Passed {
            duration: invocation.duration,
            value: invocation.value,
        })
    }

    /// Run [`execute`](Self::execute) on the current thread.
    ///
    /// # Errors
    ///
    /// As for [`execute`](Self::execute).
    pub fn execute_blocking(
        &self,
        ctx: &mut InvocationContext,
        step: &StepContext,
    ) -> Result<StepOutcome, ExecutionError> {
        futures::executor::block_on(self.execute(ctx, step))
    }

    /// Run the hooks of `hook_type` whose scope admits `scope`, in order,
    /// stopping at the first failure. Returns how many hooks ran.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::HookFailed`] for the first failing hook.
    pub async fn run_hooks(
        &self,
        hook_type: HookType,
        ctx: &mut InvocationContext,
        scope: &ScopeContext<'_>,
    ) -> Result<usize, ExecutionError> {
        let mut ran = 0;
        for hook in self.registry.get_hooks(Some(hook_type)) {
            if hook.scope().matches(scope).is_none() {
                continue;
            }
            log::trace!("running {hook_type} hook {}", hook.method());
            self.invoker
                .invoke(hook.method(), ctx, Vec::new())
                .await
                .map_err(|source| ExecutionError::HookFailed {
                    hook_type,
                    hook: hook.method().to_string(),
                    source,
                })?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Run [`run_hooks`](Self::run_hooks) on the current thread.
    ///
    /// # Errors
    ///
    /// As for [`run_hooks`](Self::run_hooks).
    pub fn run_hooks_blocking(
        &self,
        hook_type: HookType,
        ctx: &mut InvocationContext,
        scope: &ScopeContext<'_>,
    ) -> Result<usize, ExecutionError> {
        futures::executor::block_on(self.run_hooks(hook_type, ctx, scope))
    }
}

fn describe(candidates: &[BindingMatch]) -> Vec<String> {
    candidates.iter().map(ToString::to_string).collect()
}
