//! Tests for transformation-aware conversion.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use rstest::rstest;

use super::*;
use crate::datatable::DataTable;
use crate::factory::BindingFactory;
use crate::invoker::DefaultBindingInvoker;
use crate::method::BindingMethod;

#[derive(Debug, PartialEq, Eq)]
struct Money(i32);
impl crate::BindableType for Money {}

#[derive(Debug, PartialEq, Eq)]
struct Basket(Vec<String>);
impl crate::BindableType for Basket {}

#[derive(Debug, PartialEq, Eq)]
struct Label(&'static str);
impl crate::BindableType for Label {}

#[derive(Debug)]
struct Ping;
impl crate::BindableType for Ping {}

#[derive(Debug)]
struct Pong;
impl crate::BindableType for Pong {}

fn transformation(
    regex: Option<&str>,
    order: Option<i32>,
    method: BindingMethod,
) -> StepArgumentTransformationBinding {
    let Ok(binding) =
        BindingFactory::default().create_transformation(None, regex, order, Arc::new(method))
    else {
        panic!("transformation should build");
    };
    binding
}

fn registry(transformations: Vec<StepArgumentTransformationBinding>) -> BindingRegistry {
    let mut registry = BindingRegistry::new();
    for transformation in transformations {
        assert!(
            registry
                .register_step_argument_transformation(transformation)
                .is_ok()
        );
    }
    registry
}

fn money() -> StepArgumentTransformationBinding {
    transformation(
        Some(r"^\$(\d+)$"),
        None,
        BindingMethod::sync("Transforms", "money", |_, mut args| {
            let amount: i32 = args.take()?;
            Ok(Some(StepValue::new(Money(amount))))
        })
        .with_parameter::<i32>("amount")
        .returning::<Money>(),
    )
}

fn text(value: &str) -> StepValue {
    StepValue::new(value.to_string())
}

fn convert(
    registry: &BindingRegistry,
    value: StepValue,
    target: &BindingType,
) -> Result<StepValue, ConversionError> {
    let converter = StepArgumentTypeConverter::new(registry, &DefaultBindingInvoker);
    let mut ctx = InvocationContext::default();
    converter.convert_blocking(value, target, &mut ctx, &BindingCulture::invariant())
}

#[test]
fn regex_transformation_receives_converted_captures() {
    let registry = registry(vec![money()]);
    let Ok(value) = convert(&registry, text("$42"), &BindingType::of::<Money>()) else {
        panic!("money should convert");
    };
    assert_eq!(value.downcast::<Money>().ok(), Some(Money(42)));
}

#[test]
fn values_of_the_target_type_pass_through() {
    let registry = registry(vec![money()]);
    let Ok(value) = convert(&registry, StepValue::new(7_i32), &BindingType::of::<i32>()) else {
        panic!("identity conversion should succeed");
    };
    assert_eq!(value.downcast::<i32>().ok(), Some(7));
}

#[test]
fn transformation_is_not_reapplied_to_its_own_output() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let trim = transformation(
        None,
        None,
        BindingMethod::sync("Transforms", "trim", move |_, mut args| {
            counter.fetch_add(1, Ordering::SeqCst);
            let text: String = args.take()?;
            Ok(Some(StepValue::new(text.trim().to_string())))
        })
        .with_parameter::<String>("text")
        .returning::<String>(),
    );
    let registry = registry(vec![trim]);
    let Ok(value) = convert(&registry, text("  padded  "), &BindingType::of::<String>()) else {
        panic!("trim should convert");
    };
    assert_eq!(value.as_text(), Some("padded"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn detects_transformation_cycles() {
    let ping = transformation(
        None,
        None,
        BindingMethod::sync("Transforms", "ping", |_, _| Ok(Some(StepValue::new(Ping))))
            .with_parameter::<Pong>("pong")
            .returning::<Ping>(),
    );
    let pong = transformation(
        None,
        None,
        BindingMethod::sync("Transforms", "pong", |_, _| Ok(Some(StepValue::new(Pong))))
            .with_parameter::<Ping>("ping")
            .returning::<Pong>(),
    );
    let registry = registry(vec![ping, pong]);
    let Err(err) = convert(&registry, text("serve"), &BindingType::of::<Ping>()) else {
        panic!("cyclic transformations should fail");
    };
    assert_eq!(
        err.to_string(),
        "transformation cycle detected converting to Ping: ping -> pong -> ping"
    );
}

#[test]
fn bounds_transformation_depth() {
    let ping = transformation(
        Some("a(.*)"),
        None,
        BindingMethod::sync("Transforms", "ping", |_, _| Ok(Some(StepValue::new(Ping))))
            .with_parameter::<Pong>("rest")
            .returning::<Ping>(),
    );
    let pong = transformation(
        Some("b(.*)"),
        None,
        BindingMethod::sync("Transforms", "pong", |_, _| Ok(Some(StepValue::new(Pong))))
            .with_parameter::<Ping>("rest")
            .returning::<Pong>(),
    );
    let registry = registry(vec![ping, pong]);
    let converter =
        StepArgumentTypeConverter::new(&registry, &DefaultBindingInvoker).with_max_depth(3);
    let mut ctx = InvocationContext::default();
    let result = converter.convert_blocking(
        text("abababab"),
        &BindingType::of::<Ping>(),
        &mut ctx,
        &BindingCulture::invariant(),
    );
    assert!(matches!(
        result,
        Err(ConversionError::DepthExceeded { limit: 3, .. })
    ));
}

#[rstest]
#[case(Some(1), Some(2), "low")]
#[case(Some(2), Some(1), "high")]
#[case(None, None, "low")]
fn lowest_order_wins_and_ties_take_the_first(
    #[case] low_order: Option<i32>,
    #[case] high_order: Option<i32>,
    #[case] expected: &'static str,
) {
    let labelled = |label: &'static str, order| {
        transformation(
            Some(r"(\d+)"),
            order,
            BindingMethod::sync("Transforms", label, move |_, _| {
                Ok(Some(StepValue::new(Label(label))))
            })
            .with_parameter::<String>("text")
            .returning::<Label>(),
        )
    };
    let registry = registry(vec![labelled("low", low_order), labelled("high", high_order)]);
    let Ok(value) = convert(&registry, text("12"), &BindingType::of::<Label>()) else {
        panic!("labelled transformation should convert");
    };
    assert_eq!(value.downcast::<Label>().ok(), Some(Label(expected)));
}

#[test]
fn table_transformations_receive_the_table() {
    let basket = transformation(
        None,
        None,
        BindingMethod::sync("Transforms", "basket", |_, mut args| {
            let table: DataTable = args.take()?;
            let items = table.column("item")?.into_iter().map(str::to_string).collect();
            Ok(Some(StepValue::new(Basket(items))))
        })
        .with_parameter::<DataTable>("table")
        .returning::<Basket>(),
    );
    let registry = registry(vec![basket]);
    let Ok(table) = DataTable::from_rows(vec![
        vec!["item".to_string()],
        vec!["apple".to_string()],
        vec!["pear".to_string()],
    ]) else {
        panic!("table should build");
    };
    let Ok(value) = convert(&registry, StepValue::new(table), &BindingType::of::<Basket>()) else {
        panic!("basket should convert");
    };
    assert_eq!(
        value.downcast::<Basket>().ok(),
        Some(Basket(vec!["apple".into(), "pear".into()]))
    );
}

#[rstest]
#[case("$42", true)]
#[case("42", false)]
fn probes_transformations_without_running_them(#[case] input: &str, #[case] expected: bool) {
    let registry = registry(vec![money()]);
    let converter = StepArgumentTypeConverter::new(&registry, &DefaultBindingInvoker);
    assert_eq!(
        converter.can_convert(
            &text(input),
            &BindingType::of::<Money>(),
            &BindingCulture::invariant()
        ),
        expected
    );
}

#[rstest]
#[case("42", true)]
#[case("forty-two", false)]
fn probes_simple_conversion(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(
        StepArgumentTypeConverter::can_convert_simple(
            &text(input),
            &BindingType::of::<i32>(),
            &BindingCulture::invariant()
        ),
        expected
    );
}

#[test]
fn failing_transformations_keep_their_source() {
    let failing = transformation(
        None,
        None,
        BindingMethod::sync("Transforms", "refuse", |_, _| Err("no money today".into()))
            .with_parameter::<String>("text")
            .returning::<Money>(),
    );
    let registry = registry(vec![failing]);
    let Err(err) = convert(&registry, text("$1"), &BindingType::of::<Money>()) else {
        panic!("refusing transformation should fail");
    };
    let ConversionError::TransformationFailed { source, .. } = err else {
        panic!("expected a transformation failure, got {err:?}");
    };
    assert_eq!(
        source.into_source().map(|failure| failure.to_string()).as_deref(),
        Some("no money today")
    );
}

#[test]
fn transformations_must_return_their_declared_type() {
    let wrong = transformation(
        None,
        None,
        BindingMethod::sync("Transforms", "wrong", |_, _| Ok(Some(StepValue::new(1_u8))))
            .with_parameter::<String>("text")
            .returning::<Money>(),
    );
    let registry = registry(vec![wrong]);
    let Err(err) = convert(&registry, text("$1"), &BindingType::of::<Money>()) else {
        panic!("mistyped result should fail");
    };
    assert!(matches!(
        err,
        ConversionError::UnexpectedResult { ref actual, .. } if actual == "u8"
    ));
}

#[test]
fn regex_groups_must_fit_the_parameters() {
    let pair = transformation(
        Some(r"(\d+)-(\d+)"),
        None,
        BindingMethod::sync("Transforms", "pair", |_, _| Ok(Some(StepValue::new(Money(0)))))
            .with_parameter::<i32>("low")
            .returning::<Money>(),
    );
    let registry = registry(vec![pair]);
    let Err(err) = convert(&registry, text("1-2"), &BindingType::of::<Money>()) else {
        panic!("arity mismatch should fail");
    };
    assert!(matches!(
        err,
        ConversionError::ArgumentCount {
            expected: 1,
            actual: 2,
            ..
        }
    ));
}

#[tokio::test]
async fn awaits_async_transformations() {
    let doubled = transformation(
        Some(r"double (\d+)"),
        None,
        BindingMethod::asynchronous("Transforms", "double", |_, mut args| {
            async move {
                let amount: i32 = args.take()?;
                Ok(Some(StepValue::new(Money(amount * 2))))
            }
            .boxed_local()
        })
        .with_parameter::<i32>("amount")
        .returning::<Money>(),
    );
    let registry = registry(vec![doubled]);
    let converter = StepArgumentTypeConverter::new(&registry, &DefaultBindingInvoker);
    let mut ctx = InvocationContext::default();
    let result = converter
        .convert(
            text("double 21"),
            &BindingType::of::<Money>(),
            &mut ctx,
            &BindingCulture::invariant(),
        )
        .await;
    assert_eq!(result.ok().and_then(|value| value.downcast::<Money>().ok()), Some(Money(42)));
}
