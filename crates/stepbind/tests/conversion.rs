//! Conversion of step text into parameter values.

use chrono::NaiveDate;
use rstest::rstest;
use stepbind::{
    BindableType, BindingCulture, BindingDiscovery, BindingMethod, BindingType, RuntimeConfig,
    StepArgumentTypeConverter, StepContext, StepDefinitionDescriptor, StepDefinitionType,
    StepValue,
};
use uuid::Uuid;

mod common;
use common::{executor_with, run};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Weekday {
    Monday,
    Friday,
}
stepbind::step_enum!(Weekday { Monday, Friday });

fn convert<T: BindableType>(text: &str, culture: &BindingCulture) -> Option<T> {
    StepArgumentTypeConverter::convert_simple(
        &StepValue::new(text.to_string()),
        &BindingType::of::<T>(),
        culture,
    )
    .ok()
    .and_then(|value| value.downcast::<T>().ok())
}

#[rstest]
#[case("True")]
#[case("false")]
fn booleans_render_back_to_their_text(#[case] text: &str) {
    let Some(value) = convert::<bool>(text, &BindingCulture::invariant()) else {
        panic!("`{text}` should convert");
    };
    assert!(value.to_string().eq_ignore_ascii_case(text));
}

#[test]
fn values_render_back_to_equivalent_text() {
    let culture = BindingCulture::invariant();

    let guid = "6f9619ff-8b86-d011-b42d-00c04fc964ff";
    assert_eq!(convert::<Uuid>(guid, &culture).map(|v| v.to_string()).as_deref(), Some(guid));

    assert_eq!(convert::<i64>("-42", &culture).map(|v| v.to_string()).as_deref(), Some("-42"));

    assert_eq!(convert::<Weekday>("friday", &culture), Some(Weekday::Friday));
    assert_eq!(convert::<Weekday>("Monday", &culture), Some(Weekday::Monday));

    let date = convert::<NaiveDate>("03/15/2024", &culture);
    assert_eq!(
        date.map(|d| d.format("%m/%d/%Y").to_string()).as_deref(),
        Some("03/15/2024")
    );
}

#[test]
fn enums_do_not_accept_numbers() {
    assert_eq!(convert::<Weekday>("1", &BindingCulture::invariant()), None);
}

fn measurements(discovery: &mut BindingDiscovery) {
    discovery.step(StepDefinitionDescriptor::given(
        Some("the weight is (.*) kg"),
        BindingMethod::sync("Scales", "weight", |ctx, mut args| {
            ctx.insert(args.take::<f64>()?);
            Ok(None)
        })
        .with_parameter::<f64>("weight"),
    ));
}

#[rstest]
#[case("invariant", "1,234.5")]
#[case("de-DE", "1.234,5")]
fn step_culture_governs_number_formats(#[case] culture: &str, #[case] text: &str) {
    let Some(culture) = BindingCulture::from_name(culture) else {
        panic!("culture should be known");
    };
    let executor = executor_with(measurements, RuntimeConfig::default().with_culture(culture));
    let step = StepContext::new(StepDefinitionType::Given, format!("the weight is {text} kg"));
    let (outcome, ctx) = run(&executor, &step);
    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(ctx.get::<f64>().map(ToString::to_string).as_deref(), Some("1234.5"));
}
