//! End-to-end behaviour of matching, conversion and invocation.

use rstest::rstest;
use stepbind::{
    BindableType, BindingDiscovery, BindingMethod, ExecutionError, RuntimeConfig,
    ScopeDescriptor, StepContext, StepDefinitionDescriptor, StepDefinitionType, StepOutcome,
    StepValue, TransformationDescriptor,
};

mod common;
use common::{executor_with, run};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Total(i32);

#[derive(Debug, PartialEq, Eq)]
struct Money(i32);
impl BindableType for Money {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    Red,
    Green,
    LightBlue,
}
stepbind::step_enum!(Colour { Red, Green, LightBlue });

#[derive(Debug, PartialEq, Eq)]
struct Paid(&'static str);

fn calculator(discovery: &mut BindingDiscovery) {
    discovery.step(StepDefinitionDescriptor::when(
        Some(r"I add (\d+) and (\d+)"),
        BindingMethod::sync("Calculator", "add", |ctx, mut args| {
            let a: i32 = args.take()?;
            let b: i32 = args.take()?;
            ctx.insert(Total(a + b));
            Ok(None)
        })
        .with_parameter::<i32>("a")
        .with_parameter::<i32>("b"),
    ));
}

fn payments(discovery: &mut BindingDiscovery) {
    discovery
        .step(StepDefinitionDescriptor::when(
            Some("I pay"),
            BindingMethod::sync("Payments", "pay", |ctx, _| {
                ctx.insert(Paid("anywhere"));
                Ok(None)
            }),
        ))
        .step(
            StepDefinitionDescriptor::when(
                Some("I pay"),
                BindingMethod::sync("Checkout", "pay", |ctx, _| {
                    ctx.insert(Paid("checkout"));
                    Ok(None)
                }),
            )
            .scoped(ScopeDescriptor::default().feature("Checkout")),
        );
}

fn duplicated(discovery: &mut BindingDiscovery) {
    for name in ["first", "second"] {
        discovery.step(StepDefinitionDescriptor::given(
            Some("a registered user"),
            BindingMethod::sync("Users", name, |_, _| Ok(None)),
        ));
    }
}

fn pricing(discovery: &mut BindingDiscovery) {
    discovery
        .transformation(TransformationDescriptor::new(
            Some(r"^\$(\d+)$"),
            BindingMethod::sync("Transforms", "money", |_, mut args| {
                let amount: i32 = args.take()?;
                Ok(Some(StepValue::new(Money(amount))))
            })
            .with_parameter::<i32>("amount")
            .returning::<Money>(),
        ))
        .step(StepDefinitionDescriptor::given(
            Some("the price is (.*)"),
            BindingMethod::sync("Prices", "price", |ctx, mut args| {
                ctx.insert(args.take::<Money>()?);
                Ok(None)
            })
            .with_parameter::<Money>("price"),
        ));
}

fn lights(discovery: &mut BindingDiscovery) {
    discovery.step(StepDefinitionDescriptor::then(
        Some("the light is (.*)"),
        BindingMethod::sync("Lights", "colour", |ctx, mut args| {
            ctx.insert(args.take::<Colour>()?);
            Ok(None)
        })
        .with_parameter::<Colour>("colour"),
    ));
}

#[test]
fn adds_captured_numbers() {
    let executor = executor_with(calculator, RuntimeConfig::default());
    let step = StepContext::new(StepDefinitionType::When, "I add 2 and 3");
    let Ok(found) = executor.find_match(&step) else {
        panic!("step should match");
    };
    let offsets: Vec<_> = found.arguments().iter().map(|arg| arg.start_offset).collect();
    assert_eq!(offsets, [Some(6), Some(12)]);

    let (outcome, ctx) = run(&executor, &step);
    assert!(matches!(outcome, Ok(StepOutcome::Passed { .. })));
    assert_eq!(ctx.get::<Total>(), Some(&Total(5)));
}

#[rstest]
#[case("I add 2 and three")]
#[case("I add 2 and 3 more")]
#[case("so I add 2 and 3")]
fn text_must_match_in_full(#[case] text: &str) {
    let executor = executor_with(calculator, RuntimeConfig::default());
    let (outcome, _) = run(&executor, &StepContext::new(StepDefinitionType::When, text));
    assert!(matches!(outcome, Err(ExecutionError::Undefined { .. })));
}

#[test]
fn step_type_must_agree() {
    let executor = executor_with(calculator, RuntimeConfig::default());
    let step = StepContext::new(StepDefinitionType::Given, "I add 2 and 3");
    assert!(matches!(
        executor.find_match(&step),
        Err(ExecutionError::Undefined { .. })
    ));
}

#[rstest]
#[case(Some("Checkout"), "checkout")]
#[case(Some("Refunds"), "anywhere")]
#[case(None, "anywhere")]
fn scoped_bindings_win_where_they_apply(#[case] feature: Option<&str>, #[case] expected: &str) {
    let executor = executor_with(payments, RuntimeConfig::default());
    let mut step = StepContext::new(StepDefinitionType::When, "I pay");
    if let Some(title) = feature {
        step = step.with_feature_title(title);
    }
    let (outcome, ctx) = run(&executor, &step);
    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(ctx.get::<Paid>().map(|paid| paid.0), Some(expected));
}

#[test]
fn equal_bindings_are_ambiguous() {
    let executor = executor_with(duplicated, RuntimeConfig::default());
    let step = StepContext::new(StepDefinitionType::Given, "a registered user");
    let (outcome, _) = run(&executor, &step);
    let Err(err) = outcome else {
        panic!("step should be ambiguous");
    };
    assert_eq!(
        err.to_string(),
        "multiple step definitions match Given 'a registered user': \
         Given Users::first() cucumber-expression 'a registered user'; \
         Given Users::second() cucumber-expression 'a registered user'"
    );
}

#[test]
fn transformations_build_domain_values() {
    let executor = executor_with(pricing, RuntimeConfig::default());
    let step = StepContext::new(StepDefinitionType::Given, "the price is $20");
    let (outcome, ctx) = run(&executor, &step);
    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(ctx.get::<Money>(), Some(&Money(20)));

    let step = StepContext::new(StepDefinitionType::Given, "the price is twenty");
    let (outcome, _) = run(&executor, &step);
    assert!(matches!(outcome, Err(ExecutionError::Conversion { .. })));
}

#[rstest]
#[case("green", Colour::Green)]
#[case("RED", Colour::Red)]
#[case("light blue", Colour::LightBlue)]
fn enum_members_bind_case_insensitively(#[case] text: &str, #[case] expected: Colour) {
    let executor = executor_with(lights, RuntimeConfig::default());
    let step = StepContext::new(StepDefinitionType::Then, format!("the light is {text}"));
    let (outcome, ctx) = run(&executor, &step);
    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(ctx.get::<Colour>(), Some(&expected));
}

#[test]
fn unknown_enum_members_fail_conversion() {
    let executor = executor_with(lights, RuntimeConfig::default());
    let step = StepContext::new(StepDefinitionType::Then, "the light is purple");
    let (outcome, _) = run(&executor, &step);
    let Err(err) = outcome else {
        panic!("conversion should fail");
    };
    assert!(matches!(err, ExecutionError::Conversion { index: 0, .. }), "{err}");
}
