//! Asynchronous step bodies and transformations under a Tokio runtime.

use std::time::Duration;

use futures::FutureExt;
use stepbind::{
    BindableType, BindingDiscovery, BindingFailure, BindingMethod, HookType, InvocationContext,
    RuntimeConfig, ScopeContext, StepContext, StepDefinitionDescriptor, StepDefinitionType,
    StepOutcome, StepValue, TransformationDescriptor,
};

mod common;
use common::executor_with;

#[derive(Debug, PartialEq, Eq)]
struct Account(String);
impl BindableType for Account {}

#[derive(Debug, PartialEq, Eq)]
struct Balance(i64);

fn banking(discovery: &mut BindingDiscovery) {
    discovery
        .transformation(
            TransformationDescriptor::new(
                Some("account (.+)"),
                BindingMethod::asynchronous("Transforms", "account", |_, mut args| {
                    async move {
                        let id: String = args.take()?;
                        tokio::time::sleep(Duration::from_millis(1)).await;
                        Ok::<_, BindingFailure>(Some(StepValue::new(Account(id))))
                    }
                    .boxed_local()
                })
                .with_parameter::<String>("id")
                .returning::<Account>(),
            )
            .named("account"),
        )
        .step(StepDefinitionDescriptor::when(
            Some("{account} receives {int}"),
            BindingMethod::asynchronous("Banking", "deposit", |ctx, mut args| {
                async move {
                    let account: Account = args.take()?;
                    let amount: i32 = args.take()?;
                    tokio::task::yield_now().await;
                    ctx.insert(account);
                    ctx.insert(Balance(i64::from(amount)));
                    Ok::<_, BindingFailure>(None)
                }
                .boxed_local()
            })
            .with_parameter::<Account>("account")
            .with_parameter::<i32>("amount"),
        ))
        .hook(stepbind::HookDescriptor::new(
            HookType::BeforeStep,
            BindingMethod::asynchronous("Hooks", "open_ledger", |ctx, _| {
                async move {
                    ctx.insert(Balance(0));
                    Ok::<_, BindingFailure>(None)
                }
                .boxed_local()
            }),
        ));
}

#[tokio::test]
async fn async_transformations_and_steps_run_in_order() {
    let executor = executor_with(banking, RuntimeConfig::default());
    let mut ctx = InvocationContext::default();

    let scope = ScopeContext::new(&[], None, None);
    let ran = executor.run_hooks(HookType::BeforeStep, &mut ctx, &scope).await;
    assert!(matches!(ran, Ok(1)));
    assert_eq!(ctx.get::<Balance>(), Some(&Balance(0)));

    let step = StepContext::new(StepDefinitionType::When, "account ABC-1 receives 250");
    let outcome = executor.execute(&mut ctx, &step).await;
    assert!(matches!(outcome, Ok(StepOutcome::Passed { .. })), "{outcome:?}");
    assert_eq!(ctx.get::<Account>(), Some(&Account("ABC-1".into())));
    assert_eq!(ctx.get::<Balance>(), Some(&Balance(250)));
}
