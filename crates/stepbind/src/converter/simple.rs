//! Simple conversion: text to scalars, enums and UUIDs without
//! transformations.

use std::any::Any;
use std::num::{IntErrorKind, ParseFloatError, ParseIntError};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use super::ConversionError;
use crate::binding_type::{BindingType, StepEnum, TypeKind, short_type_name};
use crate::culture::BindingCulture;
use crate::value::StepValue;

/// Convert `value` to `target` by the fixed precedence: enum member lookup,
/// empty text to `None` for optional UUIDs, UUID parsing, then the type's
/// strict parser followed by its lenient fallback.
pub(crate) fn convert_simple(
    target: &BindingType,
    value: &StepValue,
    culture: &BindingCulture,
) -> Result<StepValue, ConversionError> {
    let Some(runtime) = target.as_runtime() else {
        return Err(ConversionError::NonRuntimeType {
            target: target.name().to_string(),
        });
    };
    match (runtime.kind(), value.as_text()) {
        (TypeKind::Enum { parse, .. }, Some(text)) => parse(text, culture),
        (TypeKind::Guid { nullable: true }, Some("")) => Ok(StepValue::new(None::<Uuid>)),
        (TypeKind::Guid { nullable }, Some(text)) => {
            let uuid = parse_guid(text, runtime.name())?;
            Ok(if *nullable {
                StepValue::new(Some(uuid))
            } else {
                StepValue::new(uuid)
            })
        }
        (TypeKind::Parse { strict, fallback }, Some(text)) => {
            if let Some(converted) = (*strict).and_then(|strict| strict(text, culture).ok()) {
                return Ok(converted);
            }
            fallback(text, culture)
        }
        _ => Err(ConversionError::InvalidCast {
            value_type: value.type_name(),
            target: runtime.name().to_string(),
        }),
    }
}

/// Parse a UUID, also accepting braces, missing dashes and short hex
/// strings, which are right-padded with zeros.
pub(crate) fn parse_guid(text: &str, target: &str) -> Result<Uuid, ConversionError> {
    let trimmed = text.trim();
    if let Ok(uuid) = Uuid::parse_str(trimmed) {
        return Ok(uuid);
    }
    let hex: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '-'))
        .collect();
    if hex.is_empty() || hex.len() > 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConversionError::format(text, target));
    }
    Uuid::parse_str(&format!("{hex:0<32}")).map_err(|_| ConversionError::format(text, target))
}

fn target_name<T: Any>() -> String {
    short_type_name(std::any::type_name::<T>())
}

pub(crate) fn parse_integer<T>(
    text: &str,
    _culture: &BindingCulture,
) -> Result<StepValue, ConversionError>
where
    T: FromStr<Err = ParseIntError> + Any,
{
    text.trim()
        .parse::<T>()
        .map(StepValue::new)
        .map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ConversionError::Overflow {
                value: text.to_string(),
                target: target_name::<T>(),
            },
            _ => ConversionError::format(text, &target_name::<T>()),
        })
}

fn parse_float<T>(
    text: &str,
    culture: &BindingCulture,
    allow_grouping: bool,
) -> Result<StepValue, ConversionError>
where
    T: FromStr<Err = ParseFloatError> + Any,
{
    culture
        .normalise_number(text, allow_grouping)
        .and_then(|normalised| normalised.parse::<T>().ok())
        .map(StepValue::new)
        .ok_or_else(|| ConversionError::format(text, &target_name::<T>()))
}

pub(crate) fn parse_float_strict<T>(
    text: &str,
    culture: &BindingCulture,
) -> Result<StepValue, ConversionError>
where
    T: FromStr<Err = ParseFloatError> + Any,
{
    parse_float::<T>(text, culture, false)
}

pub(crate) fn parse_float_grouped<T>(
    text: &str,
    culture: &BindingCulture,
) -> Result<StepValue, ConversionError>
where
    T: FromStr<Err = ParseFloatError> + Any,
{
    parse_float::<T>(text, culture, true)
}

pub(crate) fn parse_bool(
    text: &str,
    _culture: &BindingCulture,
) -> Result<StepValue, ConversionError> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(StepValue::new(true))
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(StepValue::new(false))
    } else {
        Err(ConversionError::format(text, "bool"))
    }
}

pub(crate) fn parse_char(
    text: &str,
    _culture: &BindingCulture,
) -> Result<StepValue, ConversionError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(StepValue::new(ch)),
        _ => Err(ConversionError::format(text, "char")),
    }
}

pub(crate) fn parse_text(
    text: &str,
    _culture: &BindingCulture,
) -> Result<StepValue, ConversionError> {
    Ok(StepValue::new(text.to_string()))
}

pub(crate) fn parse_date(
    text: &str,
    culture: &BindingCulture,
) -> Result<StepValue, ConversionError> {
    let trimmed = text.trim();
    culture
        .date_formats()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(StepValue::new)
        .ok_or_else(|| ConversionError::format(text, "NaiveDate"))
}

pub(crate) fn parse_datetime(
    text: &str,
    culture: &BindingCulture,
) -> Result<StepValue, ConversionError> {
    let trimmed = text.trim();
    culture
        .datetime_formats()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            culture
                .date_formats()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(StepValue::new)
        .ok_or_else(|| ConversionError::format(text, "NaiveDateTime"))
}

pub(crate) fn parse_time(
    text: &str,
    culture: &BindingCulture,
) -> Result<StepValue, ConversionError> {
    let trimmed = text.trim();
    culture
        .time_formats()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .map(StepValue::new)
        .ok_or_else(|| ConversionError::format(text, "NaiveTime"))
}

pub(crate) fn parse_from_str<T>(
    text: &str,
    _culture: &BindingCulture,
) -> Result<StepValue, ConversionError>
where
    T: FromStr + Any,
{
    text.trim()
        .parse::<T>()
        .map(StepValue::new)
        .map_err(|_| ConversionError::format(text, &target_name::<T>()))
}

/// Case-insensitive member lookup after removing whitespace, so `light
/// blue` finds `LightBlue`.
pub(crate) fn parse_enum<T: StepEnum>(
    text: &str,
    _culture: &BindingCulture,
) -> Result<StepValue, ConversionError> {
    let wanted: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    T::NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(&wanted))
        .and_then(T::from_index)
        .map(StepValue::new)
        .ok_or_else(|| ConversionError::Argument {
            value: text.to_string(),
            target: target_name::<T>(),
            expected: T::NAMES.join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding_type::RuntimeBindingType;
    use crate::datatable::DataTable;
    use rstest::rstest;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shade {
        LightBlue,
        DarkRed,
    }

    crate::step_enum!(Shade { LightBlue, DarkRed });

    fn convert<T: crate::BindableType>(
        text: &str,
        culture: &BindingCulture,
    ) -> Result<T, String> {
        convert_simple(&BindingType::of::<T>(), &StepValue::new(text.to_string()), culture)
            .map_err(|err| err.to_string())?
            .downcast::<T>()
            .map_err(|value| format!("unexpected {value:?}"))
    }

    #[rstest]
    #[case(" 42 ", Ok(42))]
    #[case("-7", Ok(-7))]
    #[case("2147483648", Err("'2147483648' is out of range for i32".to_string()))]
    #[case("4x", Err("'4x' is not a valid i32".to_string()))]
    fn converts_integers(#[case] text: &str, #[case] expected: Result<i32, String>) {
        assert_eq!(convert::<i32>(text, &BindingCulture::invariant()), expected);
    }

    #[rstest]
    #[case("invariant", "2.5", "2.5")]
    #[case("invariant", "1,234.5", "1234.5")]
    #[case("de-DE", "2,5", "2.5")]
    #[case("de-DE", "1.234,5", "1234.5")]
    fn converts_floats_per_culture(
        #[case] culture: &str,
        #[case] text: &str,
        #[case] expected: &str,
    ) {
        let culture = BindingCulture::from_name(culture)
            .unwrap_or_else(|| panic!("culture `{culture}` should be known"));
        let Ok(value) = convert::<f64>(text, &culture) else {
            panic!("`{text}` should convert");
        };
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    #[case("True", Ok(true))]
    #[case("false", Ok(false))]
    #[case("yes", Err("'yes' is not a valid bool".to_string()))]
    fn converts_booleans(#[case] text: &str, #[case] expected: Result<bool, String>) {
        assert_eq!(convert::<bool>(text, &BindingCulture::invariant()), expected);
    }

    #[rstest]
    #[case("light blue", Shade::LightBlue)]
    #[case("DARKRED", Shade::DarkRed)]
    fn converts_enum_members(#[case] text: &str, #[case] expected: Shade) {
        assert_eq!(convert::<Shade>(text, &BindingCulture::invariant()), Ok(expected));
    }

    #[test]
    fn reports_unknown_enum_members() {
        assert_eq!(
            convert::<Shade>("green", &BindingCulture::invariant()),
            Err("'green' is not a member of Shade (expected one of: LightBlue, DarkRed)".into())
        );
    }

    #[rstest]
    #[case("1", "10000000-0000-0000-0000-000000000000")]
    #[case("{0a0b0c0d-0000-0000-0000-000000000001}", "0a0b0c0d-0000-0000-0000-000000000001")]
    #[case("0A0B0C0D000000000000000000000001", "0a0b0c0d-0000-0000-0000-000000000001")]
    fn parses_loose_guids(#[case] text: &str, #[case] expected: &str) {
        let Ok(uuid) = parse_guid(text, "Uuid") else {
            panic!("`{text}` should parse");
        };
        assert_eq!(uuid.to_string(), expected);
    }

    #[test]
    fn rejects_non_hex_guids() {
        assert!(parse_guid("not-a-guid", "Uuid").is_err());
        assert!(parse_guid("", "Uuid").is_err());
    }

    #[test]
    fn empty_text_is_none_for_optional_guids() {
        assert_eq!(convert::<Option<Uuid>>("", &BindingCulture::invariant()), Ok(None));
        assert!(convert::<Uuid>("", &BindingCulture::invariant()).is_err());
    }

    #[rstest]
    #[case("invariant", "03/01/2024", "2024-03-01")]
    #[case("en-GB", "01/03/2024", "2024-03-01")]
    #[case("de-DE", "01.03.2024", "2024-03-01")]
    #[case("fr-FR", "2024-03-01", "2024-03-01")]
    fn converts_dates_per_culture(#[case] culture: &str, #[case] text: &str, #[case] iso: &str) {
        let culture = BindingCulture::from_name(culture)
            .unwrap_or_else(|| panic!("culture `{culture}` should be known"));
        let Ok(date) = convert::<NaiveDate>(text, &culture) else {
            panic!("`{text}` should convert");
        };
        assert_eq!(date.to_string(), iso);
    }

    fn displayed<T: crate::BindableType + std::fmt::Display>(text: &str) -> Result<String, String> {
        convert::<T>(text, &BindingCulture::invariant()).map(|value| value.to_string())
    }

    fn shade_name(text: &str) -> Result<String, String> {
        convert::<Shade>(text, &BindingCulture::invariant()).map(|shade| shade.name().to_string())
    }

    fn invariant_datetime(text: &str) -> Result<String, String> {
        convert::<NaiveDateTime>(text, &BindingCulture::invariant())
            .map(|value| value.format("%m/%d/%Y %H:%M:%S").to_string())
    }

    #[rstest]
    #[case("-42", displayed::<i64>)]
    #[case("2147483647", displayed::<i32>)]
    #[case("true", displayed::<bool>)]
    #[case("false", displayed::<bool>)]
    #[case("0a0b0c0d-0000-4000-8000-000000000001", displayed::<Uuid>)]
    #[case("DarkRed", shade_name)]
    #[case("LightBlue", shade_name)]
    #[case("03/15/2024 13:45:00", invariant_datetime)]
    #[case("12/31/1999 23:59:59", invariant_datetime)]
    fn canonical_text_survives_conversion(
        #[case] canonical: &str,
        #[case] round_trip: fn(&str) -> Result<String, String>,
    ) {
        assert_eq!(round_trip(canonical).as_deref(), Ok(canonical));
    }

    #[test]
    fn date_only_text_converts_to_midnight() {
        let converted = convert::<NaiveDateTime>("2024-03-01", &BindingCulture::invariant());
        let Ok(value) = converted else {
            panic!("date should convert");
        };
        assert_eq!(value.to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn single_characters_only() {
        assert_eq!(convert::<char>("x", &BindingCulture::invariant()), Ok('x'));
        assert!(convert::<char>("xy", &BindingCulture::invariant()).is_err());
    }

    #[test]
    fn rejects_non_text_values() {
        let err = convert_simple(
            &BindingType::of::<i32>(),
            &StepValue::new(DataTable::default()),
            &BindingCulture::invariant(),
        );
        assert!(matches!(err, Err(ConversionError::InvalidCast { .. })));
    }

    #[test]
    fn rejects_named_types() {
        let err = convert_simple(
            &BindingType::named("shop::Money"),
            &StepValue::new(String::from("1")),
            &BindingCulture::invariant(),
        );
        assert!(matches!(err, Err(ConversionError::NonRuntimeType { .. })));
    }

    #[test]
    fn parsed_types_use_from_str() {
        let ty = BindingType::Runtime(RuntimeBindingType::parsed::<std::net::Ipv4Addr>());
        let input = StepValue::new(String::from(" 10.0.0.1 "));
        let Ok(value) = convert_simple(&ty, &input, &BindingCulture::invariant()) else {
            panic!("address should parse");
        };
        let address = value.downcast_ref::<std::net::Ipv4Addr>().map(ToString::to_string);
        assert_eq!(address.as_deref(), Some("10.0.0.1"));
    }
}
