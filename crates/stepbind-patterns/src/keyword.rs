//! Step keywords and the effective step types bindings declare.
//!
//! [`StepKeyword`] is what the feature file says; [`StepDefinitionType`] is
//! what a binding is declared for. Conjunctions (`And`, `But`) never reach
//! the matcher: runners resolve them against the preceding primary keyword.

use std::fmt;
use std::str::FromStr;

use gherkin::StepType;
use thiserror::Error;

/// Text that names no known keyword or step type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown step keyword '{0}'")]
pub struct UnknownKeyword(pub String);

/// Keyword written in front of a scenario step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Precondition.
    Given,
    /// Action.
    When,
    /// Outcome.
    Then,
    /// Continues the previous primary keyword.
    And,
    /// Continues the previous primary keyword.
    But,
}

impl StepKeyword {
    const ALL: [Self; 5] = [Self::Given, Self::When, Self::Then, Self::And, Self::But];

    /// Keyword as written in English Gherkin.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// Returns `true` for `And` and `But`.
    #[must_use]
    pub const fn is_conjunction(&self) -> bool {
        matches!(self, Self::And | Self::But)
    }

    /// Map a conjunction to the last primary keyword seen, recording primary
    /// keywords in `previous` as they pass. A leading conjunction resolves to
    /// `Given`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stepbind_patterns::StepKeyword;
    ///
    /// let mut previous = None;
    /// assert_eq!(StepKeyword::And.resolve(&mut previous), StepKeyword::Given);
    /// assert_eq!(StepKeyword::When.resolve(&mut previous), StepKeyword::When);
    /// assert_eq!(StepKeyword::But.resolve(&mut previous), StepKeyword::When);
    /// ```
    #[must_use]
    pub fn resolve(self, previous: &mut Option<Self>) -> Self {
        if self.is_conjunction() {
            return previous.unwrap_or(Self::Given);
        }
        *previous = Some(self);
        self
    }

    /// Resolve the keyword and return the step type a binding must declare
    /// to match it.
    #[must_use]
    pub fn effective_type(self, previous: &mut Option<Self>) -> StepDefinitionType {
        match self.resolve(previous) {
            Self::When => StepDefinitionType::When,
            Self::Then => StepDefinitionType::Then,
            Self::Given | Self::And | Self::But => StepDefinitionType::Given,
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKeyword {
    type Err = UnknownKeyword;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|keyword| keyword.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownKeyword(wanted.to_string()))
    }
}

impl From<StepType> for StepKeyword {
    fn from(step_type: StepType) -> Self {
        StepDefinitionType::from(step_type).into()
    }
}

/// Effective type of a step: `Given` (context), `When` (action) or `Then`
/// (outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepDefinitionType {
    /// Context.
    Given,
    /// Action.
    When,
    /// Outcome.
    Then,
}

impl StepDefinitionType {
    /// Every type, in scenario order.
    pub const ALL: [Self; 3] = [Self::Given, Self::When, Self::Then];

    /// Type name as used in diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        }
    }

    const fn category(self) -> &'static str {
        match self {
            Self::Given => "context",
            Self::When => "action",
            Self::Then => "outcome",
        }
    }
}

impl fmt::Display for StepDefinitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts keyword names and the category names `context`, `action` and
/// `outcome`, case-insensitively.
impl FromStr for StepDefinitionType {
    type Err = UnknownKeyword;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|ty| {
                ty.as_str().eq_ignore_ascii_case(wanted) || ty.category().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownKeyword(wanted.to_string()))
    }
}

impl From<StepDefinitionType> for StepKeyword {
    fn from(ty: StepDefinitionType) -> Self {
        match ty {
            StepDefinitionType::Given => Self::Given,
            StepDefinitionType::When => Self::When,
            StepDefinitionType::Then => Self::Then,
        }
    }
}

/// Conjunctions have no type of their own until resolved.
impl TryFrom<StepKeyword> for StepDefinitionType {
    type Error = UnknownKeyword;

    fn try_from(keyword: StepKeyword) -> Result<Self, Self::Error> {
        match keyword {
            StepKeyword::Given => Ok(Self::Given),
            StepKeyword::When => Ok(Self::When),
            StepKeyword::Then => Ok(Self::Then),
            StepKeyword::And | StepKeyword::But => Err(UnknownKeyword(keyword.to_string())),
        }
    }
}

/// The Gherkin parser resolves conjunctions itself, so its step types are
/// always primary.
impl From<StepType> for StepDefinitionType {
    fn from(step_type: StepType) -> Self {
        match step_type {
            StepType::Given => Self::Given,
            StepType::When => Self::When,
            StepType::Then => Self::Then,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(" given ", StepKeyword::Given)]
    #[case("WHEN", StepKeyword::When)]
    #[case("And", StepKeyword::And)]
    #[case("but", StepKeyword::But)]
    fn keywords_parse_case_insensitively(#[case] input: &str, #[case] expected: StepKeyword) {
        assert_eq!(input.parse(), Ok(expected));
    }

    #[test]
    fn unknown_keywords_are_named() {
        let Err(err) = "Whenever".parse::<StepKeyword>() else {
            panic!("`Whenever` is not a keyword");
        };
        assert_eq!(err.to_string(), "unknown step keyword 'Whenever'");
    }

    #[rstest]
    #[case("then", StepDefinitionType::Then)]
    #[case("context", StepDefinitionType::Given)]
    #[case(" ACTION ", StepDefinitionType::When)]
    #[case("Outcome", StepDefinitionType::Then)]
    fn definition_types_accept_categories(
        #[case] input: &str,
        #[case] expected: StepDefinitionType,
    ) {
        assert_eq!(input.parse(), Ok(expected));
    }

    #[test]
    fn conjunctions_follow_the_last_primary_keyword() {
        let keywords = [
            StepKeyword::But,
            StepKeyword::Given,
            StepKeyword::And,
            StepKeyword::When,
            StepKeyword::Then,
            StepKeyword::And,
        ];
        let mut previous = None;
        let types: Vec<_> = keywords
            .into_iter()
            .map(|keyword| keyword.effective_type(&mut previous))
            .collect();
        assert_eq!(
            types,
            [
                StepDefinitionType::Given,
                StepDefinitionType::Given,
                StepDefinitionType::Given,
                StepDefinitionType::When,
                StepDefinitionType::Then,
                StepDefinitionType::Then,
            ]
        );
        assert_eq!(previous, Some(StepKeyword::Then));
    }

    #[test]
    fn conjunctions_have_no_definition_type() {
        assert!(StepDefinitionType::try_from(StepKeyword::And).is_err());
        assert_eq!(
            StepDefinitionType::try_from(StepKeyword::Then),
            Ok(StepDefinitionType::Then)
        );
    }

    #[rstest]
    #[case(StepType::Given, StepDefinitionType::Given)]
    #[case(StepType::When, StepDefinitionType::When)]
    #[case(StepType::Then, StepDefinitionType::Then)]
    fn gherkin_step_types_map_directly(#[case] ty: StepType, #[case] expected: StepDefinitionType) {
        assert_eq!(StepDefinitionType::from(ty), expected);
        assert_eq!(StepKeyword::from(ty), StepKeyword::from(expected));
    }
}
