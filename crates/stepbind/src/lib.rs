//! Step matching and argument binding for behaviour-driven test runners.
//!
//! Bindings are discovered into a [`BindingRegistry`]: step definitions,
//! lifecycle hooks and step argument transformations, each pointing at a
//! typed [`BindingMethod`]. For every scenario step the
//! [`BindingMatchEngine`] selects the single best step definition, the
//! [`StepArgumentTypeConverter`] turns captured text, doc strings and tables
//! into the parameter types the definition declares, and the
//! [`StepExecutor`] invokes it.
//!
//! Bindings are usually declared with descriptors and submitted through
//! [`bindings!`] so they are collected at link time.
//!
//! ```
//! use stepbind::{
//!     BindingDiscovery, BindingMethod, InvocationContext, RuntimeConfig, StepContext,
//!     StepDefinitionDescriptor, StepDefinitionType, StepExecutor,
//! };
//!
//! fn register(discovery: &mut BindingDiscovery) {
//!     discovery.step(StepDefinitionDescriptor::given(
//!         Some("I have {int} cukes"),
//!         BindingMethod::sync("Cukes", "have", |ctx, mut args| {
//!             ctx.insert(args.take::<i32>()?);
//!             Ok(None)
//!         })
//!         .with_parameter::<i32>("count"),
//!     ));
//! }
//!
//! stepbind::bindings!(register);
//!
//! let config = RuntimeConfig::default();
//! let registry = BindingDiscovery::from_inventory().build(&config);
//! let executor = StepExecutor::new(std::sync::Arc::new(registry), config);
//! let mut ctx = InvocationContext::default();
//! let step = StepContext::new(StepDefinitionType::Given, "I have 42 cukes");
//! executor.execute_blocking(&mut ctx, &step)?;
//! assert_eq!(ctx.get::<i32>(), Some(&42));
//! # Ok::<(), stepbind::ExecutionError>(())
//! ```

pub use inventory::{iter, submit};

mod binding;
mod binding_type;
mod config;
mod context;
mod converter;
mod culture;
mod datatable;
mod execution;
mod factory;
mod invoker;
mod matcher;
mod method;
mod parameter_types;
mod pattern;
mod registry;
mod scope;
mod step;
mod value;

pub use binding::{
    DEFAULT_ORDER, HookBinding, HookType, SourceLocation, StepArgumentTransformationBinding,
    StepDefinitionBinding,
};
pub use binding_type::{
    BindableType, BindingType, ConvertFn, RuntimeBindingType, StepEnum, TypeKind, short_type_name,
};
pub use config::{
    ConfigError, DEFAULT_MAX_TRANSFORMATION_DEPTH, ObsoleteBehavior, RuntimeConfig,
};
pub use context::InvocationContext;
pub use converter::{ConversionError, StepArgumentTypeConverter};
pub use culture::BindingCulture;
pub use datatable::{DataTable, DataTableError, TableRecord, TableRow};
pub use execution::{ExecutionError, StepExecutor, StepOutcome};
pub use factory::{BindingError, BindingFactory, StepDefinitionBuilder};
pub use invoker::{
    BindingInvoker, DefaultBindingInvoker, DryRunBindingInvoker, Invocation, InvocationError,
};
pub use matcher::{AmbiguityReason, BindingMatch, BindingMatchEngine, MatchArgument, MatchOutcome};
pub use method::{
    BindingBody, BindingFailure, BindingFuture, BindingMethod, BindingParameter, BindingResult,
    Obsoletion,
};
pub use parameter_types::CucumberParameterTypes;
pub use pattern::StepTextPattern;
pub use registry::{
    BindingDiscovery, BindingRegistry, BindingSubmission, HookDescriptor, ReadySignal,
    RegistryError, ScopeDescriptor, StepDefinitionDescriptor, TransformationDescriptor,
};
pub use scope::{BindingScope, ScopeContext};
pub use step::StepContext;
pub use value::{ArgumentError, BindingArguments, StepArgument, StepValue};

pub use stepbind_patterns::{
    ExpressionKind, PatternError, StepDefinitionType, StepKeyword, SyntaxErrorInfo, TagExprError,
    TagExpression,
};
