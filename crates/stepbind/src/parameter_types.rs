//! Cucumber Expression parameter types backed by the binding registry.
//!
//! On top of the standard `{int}`, `{word}`, `{string}` family, bindings may
//! refer to scalar types by name (`{i32}`, `{Uuid}`), to enums used as step
//! parameters, and to user transformations by name or output type.

use hashbrown::HashMap;
use stepbind_patterns::{
    MATCH_ALL_REGEX, ParameterRegex, ParameterTypeLookup, StandardParameterTypes, strip_anchors,
};

use crate::binding::StepArgumentTransformationBinding;
use crate::binding_type::BindingType;

const SCALAR_TYPE_NAMES: [&str; 22] = [
    "i8",
    "i16",
    "i32",
    "i64",
    "i128",
    "isize",
    "u8",
    "u16",
    "u32",
    "u64",
    "u128",
    "usize",
    "f32",
    "f64",
    "bool",
    "char",
    "String",
    "str",
    "Uuid",
    "NaiveDate",
    "NaiveDateTime",
    "NaiveTime",
];

/// Parameter type registry consulted when compiling Cucumber Expressions.
///
/// # Examples
///
/// ```
/// use stepbind::CucumberParameterTypes;
/// use stepbind_patterns::{ParameterRegex, ParameterTypeLookup};
///
/// let types = CucumberParameterTypes::default();
/// assert_eq!(
///     types.parameter_regex("i32"),
///     Some(ParameterRegex::Pattern(".*".into()))
/// );
/// assert_eq!(types.parameter_regex("string"), Some(ParameterRegex::QuotedString));
/// assert!(types.parameter_regex("colour").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CucumberParameterTypes {
    custom: HashMap<String, String>,
}

impl CucumberParameterTypes {
    /// Build the registry from the registered transformations and the
    /// parameter types declared by step definitions.
    #[must_use]
    pub fn new<'a, T, P>(transformations: T, step_parameter_types: P) -> Self
    where
        T: IntoIterator<Item = &'a StepArgumentTransformationBinding>,
        P: IntoIterator<Item = &'a BindingType>,
    {
        let mut types = Self::default();
        for transformation in transformations {
            types.add_transformation(transformation);
        }
        for binding_type in step_parameter_types {
            if binding_type.is_enum() {
                types.add(binding_type.name(), MATCH_ALL_REGEX);
            }
        }
        types
    }

    /// Register a parameter type unless one with the same name exists.
    pub fn add(&mut self, name: &str, regex: &str) {
        self.custom
            .entry(name.to_string())
            .or_insert_with(|| regex.to_string());
    }

    /// Register a transformation under its name and its output type name.
    pub fn add_transformation(&mut self, transformation: &StepArgumentTransformationBinding) {
        let regex = transformation
            .regex_source()
            .map_or(MATCH_ALL_REGEX, strip_anchors)
            .to_string();
        if let Some(name) = transformation.name() {
            self.add(name, &regex);
        }
        if let Some(output) = transformation.output_type() {
            self.add(output.name(), &regex);
        }
    }

    /// Number of custom parameter types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.custom.len()
    }

    /// Returns `true` when only built-in types are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }
}

impl ParameterTypeLookup for CucumberParameterTypes {
    fn parameter_regex(&self, name: &str) -> Option<ParameterRegex> {
        if let Some(regex) = self.custom.get(name) {
            return Some(ParameterRegex::Pattern(regex.clone()));
        }
        StandardParameterTypes.parameter_regex(name).or_else(|| {
            SCALAR_TYPE_NAMES
                .contains(&name)
                .then(|| ParameterRegex::Pattern(MATCH_ALL_REGEX.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::binding::DEFAULT_ORDER;
    use crate::method::BindingMethod;
    use stepbind_patterns::compile_anchored;

    #[derive(Debug, Clone, Copy)]
    enum Colour {
        Red,
        Green,
    }
    crate::step_enum!(Colour { Red, Green });

    #[derive(Debug)]
    struct Money;
    impl crate::BindableType for Money {}

    fn money_transformation(name: Option<&str>) -> StepArgumentTransformationBinding {
        let Ok(regex) = compile_anchored(r"^\$(\d+)$") else {
            panic!("regex should compile");
        };
        let method = BindingMethod::sync("Transforms", "money", |_, _| Ok(None))
            .with_parameter::<i32>("amount")
            .returning::<Money>();
        StepArgumentTransformationBinding::new(
            name.map(str::to_string),
            Some((r"^\$(\d+)$".to_string(), regex)),
            DEFAULT_ORDER,
            Arc::new(method),
        )
    }

    #[test]
    fn transformations_register_by_name_and_output_type() {
        let transformation = money_transformation(Some("cash"));
        let types = CucumberParameterTypes::new([&transformation], std::iter::empty());
        let expected = Some(ParameterRegex::Pattern(r"\$(\d+)".into()));
        assert_eq!(types.parameter_regex("cash"), expected);
        assert_eq!(types.parameter_regex("Money"), expected);
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn enums_used_by_steps_match_anything() {
        let colour = BindingType::of::<Colour>();
        let int = BindingType::of::<i32>();
        let types = CucumberParameterTypes::new(std::iter::empty(), [&colour, &int]);
        assert_eq!(
            types.parameter_regex("Colour"),
            Some(ParameterRegex::Pattern(".*".into()))
        );
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn standard_types_are_not_shadowed_by_scalar_names() {
        let types = CucumberParameterTypes::default();
        assert_eq!(
            types.parameter_regex("int"),
            Some(ParameterRegex::Pattern(r"-?\d+".into()))
        );
        assert!(types.is_empty());
    }

    #[test]
    fn first_registration_wins() {
        let mut types = CucumberParameterTypes::default();
        types.add("amount", r"\d+");
        types.add("amount", ".*");
        assert_eq!(
            types.parameter_regex("amount"),
            Some(ParameterRegex::Pattern(r"\d+".into()))
        );
    }
}
