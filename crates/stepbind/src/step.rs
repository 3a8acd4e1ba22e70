//! The step instance being matched.

use stepbind_patterns::{StepDefinitionType, normalise_tag};

use crate::scope::ScopeContext;
use crate::value::StepArgument;

/// One scenario step as supplied by the feature runner.
///
/// The step type is the effective type: callers resolve `And`/`But` to the
/// preceding primary keyword before matching.
///
/// # Examples
///
/// ```
/// use stepbind::{StepContext, StepDefinitionType};
///
/// let step = StepContext::new(StepDefinitionType::When, "I add 2 and 3")
///     .with_tags(["web", "@web", "fast"])
///     .with_feature_title("Calculator");
/// assert_eq!(step.tags(), ["@web", "@fast"]);
/// assert_eq!(step.scope_context().feature_title(), Some("Calculator"));
/// ```
#[derive(Debug, Clone)]
pub struct StepContext {
    step_type: StepDefinitionType,
    text: String,
    argument: Option<StepArgument>,
    tags: Vec<String>,
    feature_title: Option<String>,
    scenario_title: Option<String>,
}

impl StepContext {
    /// Describe a step with no argument, tags or titles.
    #[must_use]
    pub fn new(step_type: StepDefinitionType, text: impl Into<String>) -> Self {
        Self {
            step_type,
            text: text.into(),
            argument: None,
            tags: Vec::new(),
            feature_title: None,
            scenario_title: None,
        }
    }

    /// Attach a doc string or data table.
    #[must_use]
    pub fn with_argument(mut self, argument: StepArgument) -> Self {
        self.argument = Some(argument);
        self
    }

    /// Add tags in effect, normalised to `@tag` and de-duplicated.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = normalise_tag(tag.as_ref());
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    /// Set the feature title.
    #[must_use]
    pub fn with_feature_title(mut self, title: impl Into<String>) -> Self {
        self.feature_title = Some(title.into());
        self
    }

    /// Set the scenario title.
    #[must_use]
    pub fn with_scenario_title(mut self, title: impl Into<String>) -> Self {
        self.scenario_title = Some(title.into());
        self
    }

    /// Effective step type.
    #[must_use]
    pub const fn step_type(&self) -> StepDefinitionType {
        self.step_type
    }

    /// Step text without the keyword.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attached doc string or table.
    #[must_use]
    pub const fn argument(&self) -> Option<&StepArgument> {
        self.argument.as_ref()
    }

    /// Tags in effect, with leading `@`.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Title of the running feature.
    #[must_use]
    pub fn feature_title(&self) -> Option<&str> {
        self.feature_title.as_deref()
    }

    /// Title of the running scenario.
    #[must_use]
    pub fn scenario_title(&self) -> Option<&str> {
        self.scenario_title.as_deref()
    }

    /// View for scope checks.
    #[must_use]
    pub fn scope_context(&self) -> ScopeContext<'_> {
        ScopeContext::new(
            &self.tags,
            self.feature_title.as_deref(),
            self.scenario_title.as_deref(),
        )
    }
}
