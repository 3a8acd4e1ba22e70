//! Registered bindings: step definitions, hooks and argument
//! transformations.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use regex::Regex;
use stepbind_patterns::{ExpressionKind, StepDefinitionType};

use crate::binding_type::BindingType;
use crate::method::BindingMethod;
use crate::pattern::StepTextPattern;
use crate::scope::BindingScope;
use crate::value::StepValue;

/// Order used when a hook or transformation declares none.
pub const DEFAULT_ORDER: i32 = 10_000;

/// Where a binding was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    file: &'static str,
    line: u32,
}

impl SourceLocation {
    /// Describe a location; usually built with
    /// [`source_location!`](crate::source_location).
    #[must_use]
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Source file.
    #[must_use]
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// 1-based line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Capture the current file and line as a [`SourceLocation`].
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation::new(file!(), line!())
    };
}

/// A step handler registered for one step type.
///
/// Invalid bindings keep their error message for diagnostics and are never
/// offered as match candidates.
#[derive(Debug, Clone)]
pub struct StepDefinitionBinding {
    step_type: StepDefinitionType,
    expression: Option<String>,
    kind: ExpressionKind,
    pattern: Option<StepTextPattern>,
    scope: BindingScope,
    method: Arc<BindingMethod>,
    error: Option<String>,
    location: Option<SourceLocation>,
}

impl StepDefinitionBinding {
    /// A valid binding with a compiled pattern.
    #[must_use]
    pub fn new(
        step_type: StepDefinitionType,
        pattern: StepTextPattern,
        scope: BindingScope,
        method: Arc<BindingMethod>,
    ) -> Self {
        let expression = match pattern.kind() {
            ExpressionKind::MethodName => None,
            _ => Some(pattern.as_str().to_string()),
        };
        let error = scope.error().map(str::to_string);
        Self {
            step_type,
            expression,
            kind: pattern.kind(),
            pattern: Some(pattern),
            scope,
            method,
            error,
            location: None,
        }
    }

    /// A binding whose pattern or scope failed to build.
    #[must_use]
    pub fn invalid(
        step_type: StepDefinitionType,
        expression: Option<&str>,
        kind: ExpressionKind,
        scope: BindingScope,
        method: Arc<BindingMethod>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            step_type,
            expression: expression.map(str::to_string),
            kind,
            pattern: None,
            scope,
            method,
            error: Some(error.into()),
            location: None,
        }
    }

    /// Record where the binding was declared.
    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Step type the binding answers.
    #[must_use]
    pub const fn step_type(&self) -> StepDefinitionType {
        self.step_type
    }

    /// Expression text as declared; `None` for method-name patterns.
    #[must_use]
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    /// Pattern language.
    #[must_use]
    pub const fn kind(&self) -> ExpressionKind {
        self.kind
    }

    /// Compiled pattern; `None` when invalid.
    #[must_use]
    pub const fn pattern(&self) -> Option<&StepTextPattern> {
        self.pattern.as_ref()
    }

    /// Scope restriction.
    #[must_use]
    pub const fn scope(&self) -> &BindingScope {
        &self.scope
    }

    /// Returns `true` when any scope criterion is declared.
    #[must_use]
    pub const fn is_scoped(&self) -> bool {
        !self.scope.is_empty()
    }

    /// Method to invoke.
    #[must_use]
    pub fn method(&self) -> &Arc<BindingMethod> {
        &self.method
    }

    /// Discovery error, when invalid.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` when the binding may be matched.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none() && self.pattern.is_some()
    }

    /// Declaration site.
    #[must_use]
    pub const fn location(&self) -> Option<SourceLocation> {
        self.location
    }
}

impl fmt::Display for StepDefinitionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.step_type, self.method)?;
        match (&self.pattern, &self.expression) {
            (Some(pattern), _) => write!(f, " {pattern}")?,
            (None, Some(expression)) => write!(f, " {} '{expression}'", self.kind)?,
            (None, None) => {}
        }
        if self.is_scoped() {
            write!(f, " {}", self.scope)?;
        }
        Ok(())
    }
}

/// Lifecycle points hooks attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookType {
    /// Once before any feature.
    BeforeTestRun,
    /// Once after all features.
    AfterTestRun,
    /// Before each feature.
    BeforeFeature,
    /// After each feature.
    AfterFeature,
    /// Before each scenario.
    BeforeScenario,
    /// After each scenario.
    AfterScenario,
    /// Before each run of Given, When or Then steps.
    BeforeScenarioBlock,
    /// After each run of Given, When or Then steps.
    AfterScenarioBlock,
    /// Before each step.
    BeforeStep,
    /// After each step.
    AfterStep,
}

impl HookType {
    /// Every hook type in lifecycle order.
    pub const ALL: [Self; 10] = [
        Self::BeforeTestRun,
        Self::AfterTestRun,
        Self::BeforeFeature,
        Self::AfterFeature,
        Self::BeforeScenario,
        Self::AfterScenario,
        Self::BeforeScenarioBlock,
        Self::AfterScenarioBlock,
        Self::BeforeStep,
        Self::AfterStep,
    ];

    /// Name as written in diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeTestRun => "BeforeTestRun",
            Self::AfterTestRun => "AfterTestRun",
            Self::BeforeFeature => "BeforeFeature",
            Self::AfterFeature => "AfterFeature",
            Self::BeforeScenario => "BeforeScenario",
            Self::AfterScenario => "AfterScenario",
            Self::BeforeScenarioBlock => "BeforeScenarioBlock",
            Self::AfterScenarioBlock => "AfterScenarioBlock",
            Self::BeforeStep => "BeforeStep",
            Self::AfterStep => "AfterStep",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|hook| hook.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown hook type: {s}"))
    }
}

/// A hook registered for one lifecycle point.
#[derive(Debug, Clone)]
pub struct HookBinding {
    hook_type: HookType,
    order: i32,
    scope: BindingScope,
    method: Arc<BindingMethod>,
    location: Option<SourceLocation>,
}

impl HookBinding {
    /// Describe a hook.
    #[must_use]
    pub fn new(
        hook_type: HookType,
        order: i32,
        scope: BindingScope,
        method: Arc<BindingMethod>,
    ) -> Self {
        Self {
            hook_type,
            order,
            scope,
            method,
            location: None,
        }
    }

    /// Record where the hook was declared.
    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Lifecycle point.
    #[must_use]
    pub const fn hook_type(&self) -> HookType {
        self.hook_type
    }

    /// Execution order; lower runs first.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Scope restriction.
    #[must_use]
    pub const fn scope(&self) -> &BindingScope {
        &self.scope
    }

    /// Method to invoke.
    #[must_use]
    pub fn method(&self) -> &Arc<BindingMethod> {
        &self.method
    }

    /// Declaration site.
    #[must_use]
    pub const fn location(&self) -> Option<SourceLocation> {
        self.location
    }
}

impl fmt::Display for HookBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hook {} (order {})", self.hook_type, self.method, self.order)
    }
}

/// A user conversion producing the method's return type from text or a
/// table.
#[derive(Debug, Clone)]
pub struct StepArgumentTransformationBinding {
    name: Option<String>,
    regex: Option<(String, Regex)>,
    order: i32,
    method: Arc<BindingMethod>,
    location: Option<SourceLocation>,
}

impl StepArgumentTransformationBinding {
    /// Describe a transformation. `regex` must already be anchored.
    #[must_use]
    pub fn new(
        name: Option<String>,
        regex: Option<(String, Regex)>,
        order: i32,
        method: Arc<BindingMethod>,
    ) -> Self {
        Self {
            name,
            regex,
            order,
            method,
            location: None,
        }
    }

    /// Record where the transformation was declared.
    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Parameter type name usable in Cucumber Expressions.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Regex as declared.
    #[must_use]
    pub fn regex_source(&self) -> Option<&str> {
        self.regex.as_ref().map(|(source, _)| source.as_str())
    }

    /// Anchored compiled regex.
    #[must_use]
    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref().map(|(_, regex)| regex)
    }

    /// Tie-break order; lower wins.
    #[must_use]
    pub const fn order(&self) -> i32 {
        self.order
    }

    /// Method to invoke.
    #[must_use]
    pub fn method(&self) -> &Arc<BindingMethod> {
        &self.method
    }

    /// Produced type.
    #[must_use]
    pub fn output_type(&self) -> Option<&BindingType> {
        self.method.return_type()
    }

    /// Returns `true` when the transformation consumes a data table.
    #[must_use]
    pub fn is_table_transformation(&self) -> bool {
        self.method
            .parameters()
            .first()
            .is_some_and(|parameter| parameter.binding_type().is_table())
    }

    /// Declaration site.
    #[must_use]
    pub const fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    /// Decide whether the transformation applies to `value` when producing
    /// `target`: the output type must equal `target`, text inputs must match
    /// the regex when one is declared, and otherwise the input and the
    /// first parameter must agree on being a table.
    #[must_use]
    pub fn can_transform(&self, value: &StepValue, target: &BindingType) -> bool {
        if self.output_type() != Some(target) {
            return false;
        }
        if let (Some(regex), Some(text)) = (self.regex(), value.as_text()) {
            return regex.is_match(text);
        }
        self.is_table_transformation() == value.is_table()
    }
}

impl fmt::Display for StepArgumentTransformationBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transformation {}", self.method)?;
        if let Some(source) = self.regex_source() {
            write!(f, " '{source}'")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatable::DataTable;
    use stepbind_patterns::compile_anchored;

    #[derive(Debug)]
    struct Money(i32);
    impl crate::BindableType for Money {}

    fn money_method() -> Arc<BindingMethod> {
        Arc::new(
            BindingMethod::sync("Transforms", "money", |_, mut args| {
                let amount: i32 = args.take()?;
                Ok(Some(StepValue::new(Money(amount))))
            })
            .with_parameter::<i32>("amount")
            .returning::<Money>(),
        )
    }

    fn money_transformation() -> StepArgumentTransformationBinding {
        let Ok(regex) = compile_anchored(r"^\$(\d+)$") else {
            panic!("regex should compile");
        };
        StepArgumentTransformationBinding::new(
            None,
            Some((r"^\$(\d+)$".to_string(), regex)),
            DEFAULT_ORDER,
            money_method(),
        )
    }

    #[test]
    fn transformations_apply_by_output_type_and_regex() {
        let transformation = money_transformation();
        let money = BindingType::of::<Money>();
        assert!(transformation.can_transform(&StepValue::new(String::from("$42")), &money));
        assert!(!transformation.can_transform(&StepValue::new(String::from("42")), &money));
        assert!(!transformation.can_transform(
            &StepValue::new(String::from("$42")),
            &BindingType::of::<i32>()
        ));
    }

    #[derive(Debug)]
    struct Basket;
    impl crate::BindableType for Basket {}

    #[test]
    fn table_transformations_require_table_inputs() {
        let method = Arc::new(
            BindingMethod::sync("Transforms", "basket", |_, _| Ok(None))
                .with_parameter::<DataTable>("table")
                .returning::<Basket>(),
        );
        let transformation =
            StepArgumentTransformationBinding::new(None, None, DEFAULT_ORDER, method);
        let target = BindingType::of::<Basket>();
        assert!(transformation.is_table_transformation());
        assert!(transformation.can_transform(&StepValue::new(DataTable::default()), &target));
        assert!(!transformation.can_transform(&StepValue::new(String::from("x")), &target));
    }

    #[test]
    fn hook_types_parse_case_insensitively() {
        assert_eq!("beforescenario".parse::<HookType>(), Ok(HookType::BeforeScenario));
        assert!("during".parse::<HookType>().is_err());
    }

    #[test]
    fn invalid_step_definitions_are_never_valid() {
        let binding = StepDefinitionBinding::invalid(
            StepDefinitionType::Given,
            Some("{unknown}"),
            ExpressionKind::CucumberExpression,
            BindingScope::unscoped(),
            money_method(),
            "undefined parameter type",
        );
        assert!(!binding.is_valid());
        assert_eq!(
            binding.to_string(),
            "Given Transforms::money(i32) cucumber-expression '{unknown}'"
        );
    }
}
