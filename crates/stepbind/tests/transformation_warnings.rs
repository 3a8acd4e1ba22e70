//! Warnings about equally ordered transformations.

use std::sync::{Mutex, Once};

use rstest::{fixture, rstest};
use serial_test::serial;
use stepbind::{
    BindableType, BindingCulture, BindingDiscovery, BindingMatchEngine, BindingMethod,
    RuntimeConfig, StepContext, StepDefinitionDescriptor, StepDefinitionType, StepValue,
    TransformationDescriptor,
};

mod common;
use common::{executor_with, run};

#[derive(Debug, PartialEq, Eq)]
struct Money(i32);
impl BindableType for Money {}

struct RecordingLogger;

static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static LOGGER: RecordingLogger = RecordingLogger;
static INIT_LOGGER: Once = Once::new();

impl log::Log for RecordingLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut warnings) = WARNINGS.lock() {
            warnings.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Installs the recording logger once and clears earlier warnings.
#[fixture]
fn warnings() {
    INIT_LOGGER.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Warn);
    });
    take_warnings();
}

fn take_warnings() -> Vec<String> {
    WARNINGS
        .lock()
        .map(|mut warnings| std::mem::take(&mut *warnings))
        .unwrap_or_default()
}

fn competing_prices(discovery: &mut BindingDiscovery) {
    for name in ["dollars", "cents"] {
        discovery.transformation(TransformationDescriptor::new(
            Some(r"^\$(\d+)$"),
            BindingMethod::sync("Transforms", name, |_, mut args| {
                let amount: i32 = args.take()?;
                Ok(Some(StepValue::new(Money(amount))))
            })
            .with_parameter::<i32>("amount")
            .returning::<Money>(),
        ));
    }
    discovery.step(StepDefinitionDescriptor::given(
        Some("the price is (.*)"),
        BindingMethod::sync("Prices", "price", |ctx, mut args| {
            ctx.insert(args.take::<Money>()?);
            Ok(None)
        })
        .with_parameter::<Money>("price"),
    ));
}

#[rstest]
#[serial]
fn matching_is_silent_and_conversion_warns_once(_warnings: ()) {
    let executor = executor_with(competing_prices, RuntimeConfig::default());
    let step = StepContext::new(StepDefinitionType::Given, "the price is $20");

    let engine = BindingMatchEngine::new(executor.registry());
    for _ in 0..3 {
        assert!(
            engine
                .get_best_match(&step, &BindingCulture::invariant())
                .is_match()
        );
    }
    assert_eq!(take_warnings(), Vec::<String>::new());

    let (outcome, ctx) = run(&executor, &step);
    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(ctx.get::<Money>(), Some(&Money(20)));
    let warnings = take_warnings();
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(
        warnings
            .first()
            .is_some_and(|warning| warning.contains("Transforms::dollars(i32)")),
        "{warnings:?}"
    );
}
