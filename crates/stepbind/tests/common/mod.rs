//! Helpers shared by the integration tests.

use std::sync::Arc;

use stepbind::{
    BindingDiscovery, ExecutionError, InvocationContext, RuntimeConfig, StepContext,
    StepExecutor, StepOutcome,
};

/// Build an executor over the bindings `register` declares.
pub fn executor_with(register: fn(&mut BindingDiscovery), config: RuntimeConfig) -> StepExecutor {
    let mut discovery = BindingDiscovery::new();
    register(&mut discovery);
    let registry = discovery.build(&config);
    assert!(
        registry.errors().is_empty(),
        "unexpected binding errors: {:?}",
        registry.errors()
    );
    StepExecutor::new(Arc::new(registry), config)
}

/// Execute `step` in a fresh context, returning the outcome and the context.
pub fn run(
    executor: &StepExecutor,
    step: &StepContext,
) -> (Result<StepOutcome, ExecutionError>, InvocationContext) {
    let mut ctx = InvocationContext::default();
    let outcome = executor.execute_blocking(&mut ctx, step);
    (outcome, ctx)
}
