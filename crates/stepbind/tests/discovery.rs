//! Link-time discovery, hook ordering and the ready signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stepbind::{
    BindingDiscovery, BindingMethod, BindingScope, HookDescriptor, HookType, InvocationContext,
    RegistryError, RuntimeConfig, ScopeContext, ScopeDescriptor, StepContext,
    StepDefinitionDescriptor, StepDefinitionType, StepExecutor, TransformationDescriptor,
};

static HOOK_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

fn log_hook(name: &'static str) -> BindingMethod {
    BindingMethod::sync("Hooks", name, move |_, _| {
        if let Ok(mut log) = HOOK_LOG.lock() {
            log.push(name);
        }
        Ok(None)
    })
}

fn register(discovery: &mut BindingDiscovery) {
    discovery
        .step(
            StepDefinitionDescriptor::given(
                Some("a discovered step"),
                BindingMethod::sync("Discovered", "step", |_, _| Ok(None)),
            )
            .at(stepbind::source_location!()),
        )
        .step(StepDefinitionDescriptor::any(
            Some("any keyword works"),
            BindingMethod::sync("Discovered", "any", |_, _| Ok(None)),
        ))
        .step(StepDefinitionDescriptor::then(
            Some("a broken {unknown}"),
            BindingMethod::sync("Discovered", "broken", |_, _| Ok(None)),
        ))
        .hook(HookDescriptor::new(HookType::BeforeScenario, log_hook("second")).order(2))
        .hook(HookDescriptor::new(HookType::BeforeScenario, log_hook("first")).order(1))
        .hook(
            HookDescriptor::new(HookType::BeforeScenario, log_hook("tagged"))
                .order(3)
                .scoped(ScopeDescriptor::default().tag("@smoke")),
        )
        .transformation(TransformationDescriptor::new(
            Some("unused"),
            BindingMethod::sync("Discovered", "untyped", |_, _| Ok(None)),
        ));
}

stepbind::bindings!(register);

fn discovered() -> StepExecutor {
    let config = RuntimeConfig::default();
    let registry = BindingDiscovery::from_inventory().build(&config);
    StepExecutor::new(Arc::new(registry), config)
}

#[test]
fn submitted_bindings_are_collected() {
    let executor = discovered();
    assert!(executor.registry().is_ready());
    let step = StepContext::new(StepDefinitionType::Given, "a discovered step");
    let Ok(found) = executor.find_match(&step) else {
        panic!("discovered step should match");
    };
    let location = found.binding().and_then(|binding| binding.location());
    assert_eq!(location.map(|loc| loc.file()), Some(file!()));
}

#[test]
fn any_keyword_bindings_match_every_step_type() {
    let executor = discovered();
    for step_type in StepDefinitionType::ALL {
        let step = StepContext::new(step_type, "any keyword works");
        assert!(executor.find_match(&step).is_ok(), "{step_type} should match");
    }
}

#[test]
fn invalid_declarations_are_recorded_not_fatal() {
    let executor = discovered();
    let errors = executor.registry().errors();
    assert_eq!(errors.len(), 2, "{errors:?}");
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert!(messages.iter().any(|m| m.contains("Discovered::broken()")), "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("Discovered::untyped()")), "{messages:?}");

    let step = StepContext::new(StepDefinitionType::Then, "a broken thing");
    assert!(executor.find_match(&step).is_err());
}

#[test]
fn hooks_run_by_order_within_scope() {
    let executor = discovered();
    let mut ctx = InvocationContext::default();
    let tags = vec!["@regression".to_string()];
    let Ok(ran) = executor.run_hooks_blocking(
        HookType::BeforeScenario,
        &mut ctx,
        &ScopeContext::new(&tags, None, None),
    ) else {
        panic!("hooks should run");
    };
    assert_eq!(ran, 2);
    let log = HOOK_LOG.lock().map(|log| log.clone()).unwrap_or_default();
    assert_eq!(log, ["first", "second"]);
}

#[test]
fn ready_signal_fires_once_registration_completes() {
    let mut registry = stepbind::BindingRegistry::new();
    let signal = registry.ready_signal();
    let fired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fired);
    signal.on_ready(move || flag.store(true, Ordering::SeqCst));
    assert!(!signal.wait_timeout(Duration::from_millis(10)));

    let waiter = {
        let signal = signal.clone();
        std::thread::spawn(move || signal.wait())
    };
    let mut discovery = BindingDiscovery::new();
    register(&mut discovery);
    assert!(discovery.register_into(&mut registry, &RuntimeConfig::default()).is_ok());
    assert!(waiter.join().is_ok());
    assert!(fired.load(Ordering::SeqCst));
    assert!(signal.is_ready());

    let hook = stepbind::BindingFactory::default().create_hook(
        HookType::AfterScenario,
        None,
        BindingScope::unscoped(),
        Arc::new(log_hook("late")),
    );
    let Ok(hook) = hook else {
        panic!("hook should be valid");
    };
    assert_eq!(
        registry.register_hook(hook),
        Err(RegistryError::RegistrationAfterReady { kind: "hook" })
    );
}
