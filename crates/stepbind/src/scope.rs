//! Binding scopes: the tag, feature and scenario restrictions that narrow
//! when a binding applies.

use std::fmt;

use stepbind_patterns::TagExpression;

/// Where a step or hook runs, as seen by scope checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeContext<'a> {
    tags: &'a [String],
    feature_title: Option<&'a str>,
    scenario_title: Option<&'a str>,
}

impl<'a> ScopeContext<'a> {
    /// Describe a context. Tags carry their leading `@`.
    #[must_use]
    pub const fn new(
        tags: &'a [String],
        feature_title: Option<&'a str>,
        scenario_title: Option<&'a str>,
    ) -> Self {
        Self {
            tags,
            feature_title,
            scenario_title,
        }
    }

    /// Tags in effect.
    #[must_use]
    pub const fn tags(&self) -> &'a [String] {
        self.tags
    }

    /// Title of the running feature.
    #[must_use]
    pub const fn feature_title(&self) -> Option<&'a str> {
        self.feature_title
    }

    /// Title of the running scenario.
    #[must_use]
    pub const fn scenario_title(&self) -> Option<&'a str> {
        self.scenario_title
    }
}

/// Restricts a binding to steps with matching tags, feature or scenario.
///
/// Each declared criterion must hold for the scope to match; the number of
/// declared criteria ranks competing bindings by specificity.
///
/// # Examples
///
/// ```
/// use stepbind::{BindingScope, ScopeContext};
///
/// let scope = BindingScope::new(Some("@web and not @slow"), Some("Checkout"), None);
/// let tags = vec!["@web".to_string()];
/// let ctx = ScopeContext::new(&tags, Some("Checkout"), Some("Pay by card"));
/// assert_eq!(scope.matches(&ctx), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BindingScope {
    tag_expression: Option<TagExpression>,
    tag_source: Option<String>,
    feature_title: Option<String>,
    scenario_title: Option<String>,
    error: Option<String>,
}

impl BindingScope {
    /// Build a scope. Blank values mean "not restricted". A tag expression
    /// that fails to parse yields an invalid scope carrying the error.
    #[must_use]
    pub fn new(
        tag: Option<&str>,
        feature_title: Option<&str>,
        scenario_title: Option<&str>,
    ) -> Self {
        let tag_source = non_blank(tag);
        let (tag_expression, error) = match tag_source.as_deref().map(TagExpression::parse) {
            Some(Ok(expression)) => (Some(expression), None),
            Some(Err(err)) => (None, Some(format!("invalid scope tag expression: {err}"))),
            None => (None, None),
        };
        Self {
            tag_expression,
            tag_source,
            feature_title: non_blank(feature_title),
            scenario_title: non_blank(scenario_title),
            error,
        }
    }

    /// A scope with no restrictions.
    #[must_use]
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// Returns `false` when the tag expression failed to parse.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Parse failure of the tag expression.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` when no criterion is declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tag_source.is_none() && self.feature_title.is_none() && self.scenario_title.is_none()
    }

    /// Tag expression as written.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag_source.as_deref()
    }

    /// Required feature title.
    #[must_use]
    pub fn feature_title(&self) -> Option<&str> {
        self.feature_title.as_deref()
    }

    /// Required scenario title.
    #[must_use]
    pub fn scenario_title(&self) -> Option<&str> {
        self.scenario_title.as_deref()
    }

    /// Check the scope against `ctx`.
    ///
    /// Returns `None` when the scope is invalid or any declared criterion
    /// fails, otherwise the number of criteria that matched.
    #[must_use]
    pub fn matches(&self, ctx: &ScopeContext<'_>) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        let mut matched = 0;
        if let Some(expression) = &self.tag_expression {
            if !expression.evaluate(ctx.tags().iter().map(String::as_str)) {
                return None;
            }
            matched += 1;
        }
        if let Some(title) = &self.feature_title {
            if ctx.feature_title() != Some(title.as_str()) {
                return None;
            }
            matched += 1;
        }
        if let Some(title) = &self.scenario_title {
            if ctx.scenario_title() != Some(title.as_str()) {
                return None;
            }
            matched += 1;
        }
        Some(matched)
    }
}

impl fmt::Display for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(tag) = &self.tag_source {
            parts.push(format!("tag: {tag}"));
        }
        if let Some(title) = &self.feature_title {
            parts.push(format!("feature: {title}"));
        }
        if let Some(title) = &self.scenario_title {
            parts.push(format!("scenario: {title}"));
        }
        if parts.is_empty() {
            f.write_str("unscoped")
        } else {
            write!(f, "[{}]", parts.join(", "))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|tag| (*tag).to_string()).collect()
    }

    #[rstest]
    #[case(BindingScope::unscoped(), Some(0))]
    #[case(BindingScope::new(Some("@web"), None, None), Some(1))]
    #[case(BindingScope::new(Some("web"), None, None), Some(1))]
    #[case(BindingScope::new(Some("@api"), None, None), None)]
    #[case(BindingScope::new(None, Some("Checkout"), None), Some(1))]
    #[case(BindingScope::new(Some("@web"), Some("Checkout"), Some("Pay")), Some(3))]
    #[case(BindingScope::new(None, Some("Checkout"), Some("Refund")), None)]
    #[case(BindingScope::new(Some("  "), Some(""), None), Some(0))]
    fn counts_matching_criteria(#[case] scope: BindingScope, #[case] expected: Option<usize>) {
        let tags = tags(&["@web", "@fast"]);
        let ctx = ScopeContext::new(&tags, Some("Checkout"), Some("Pay"));
        assert_eq!(scope.matches(&ctx), expected);
    }

    #[test]
    fn invalid_tag_expressions_never_match() {
        let scope = BindingScope::new(Some("@web and"), None, None);
        assert!(!scope.is_valid());
        assert!(scope.error().is_some_and(|err| err.contains("invalid scope tag expression")));
        let tags = tags(&["@web"]);
        assert_eq!(scope.matches(&ScopeContext::new(&tags, None, None)), None);
    }

    #[test]
    fn renders_declared_criteria() {
        assert_eq!(BindingScope::unscoped().to_string(), "unscoped");
        assert_eq!(
            BindingScope::new(Some("@web"), Some("Checkout"), None).to_string(),
            "[tag: @web, feature: Checkout]"
        );
    }
}
