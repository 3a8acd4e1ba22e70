//! Binding construction from declared metadata.
//!
//! The factory picks the pattern language for a step definition, compiles
//! it, and reports failures as [`BindingError`]s so discovery can record
//! them without aborting.

use std::fmt;
use std::sync::Arc;

use stepbind_patterns::{
    ExpressionKind, ParameterTypeLookup, StepDefinitionType, compile_anchored,
    is_cucumber_expression,
};
use thiserror::Error;

use crate::binding::{
    DEFAULT_ORDER, HookBinding, HookType, StepArgumentTransformationBinding, StepDefinitionBinding,
};
use crate::method::BindingMethod;
use crate::pattern::StepTextPattern;
use crate::scope::BindingScope;

/// Errors raised while turning declarations into bindings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindingError {
    /// The step definition expression failed to compile.
    #[error("invalid {kind} '{expression}' on {method}: {reason}")]
    InvalidExpression {
        /// Method the expression is declared on.
        method: String,
        /// Pattern language the expression was compiled as.
        kind: ExpressionKind,
        /// Expression text.
        expression: String,
        /// Compiler message.
        reason: String,
    },
    /// The scope tag expression failed to parse.
    #[error("invalid scope on {method}: {reason}")]
    InvalidScope {
        /// Method the scope is declared on.
        method: String,
        /// Parser message.
        reason: String,
    },
    /// The transformation regex failed to compile.
    #[error("invalid transformation regex '{regex}' on {method}: {reason}")]
    InvalidTransformationRegex {
        /// Transformation method.
        method: String,
        /// Regex text.
        regex: String,
        /// Compiler message.
        reason: String,
    },
    /// A transformation method declares no return type.
    #[error("step argument transformation {method} has no return type")]
    MissingReturnType {
        /// Transformation method.
        method: String,
    },
    /// Any other discovery failure.
    #[error("{0}")]
    Generic(String),
}

/// How a step definition pattern is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDefinitionBuilder {
    /// No expression: derive a regex from the method name.
    MethodName,
    /// Compile the text as a Cucumber Expression.
    CucumberExpression(String),
    /// Compile the text as an anchored regex.
    Regex(String),
}

impl StepDefinitionBuilder {
    /// Pattern language the builder produces.
    #[must_use]
    pub const fn kind(&self) -> ExpressionKind {
        match self {
            Self::MethodName => ExpressionKind::MethodName,
            Self::CucumberExpression(_) => ExpressionKind::CucumberExpression,
            Self::Regex(_) => ExpressionKind::RegularExpression,
        }
    }

    /// Expression text, when one was declared.
    #[must_use]
    pub fn expression(&self) -> Option<&str> {
        match self {
            Self::MethodName => None,
            Self::CucumberExpression(text) | Self::Regex(text) => Some(text),
        }
    }

    fn build(
        &self,
        method: &BindingMethod,
        parameter_types: &dyn ParameterTypeLookup,
    ) -> Result<StepTextPattern, BindingError> {
        let compiled = match self {
            Self::MethodName => {
                let names: Vec<&str> = method
                    .parameters()
                    .iter()
                    .map(|parameter| parameter.name())
                    .collect();
                StepTextPattern::method_name(method.name(), &names)
            }
            Self::CucumberExpression(text) => {
                StepTextPattern::cucumber_expression(text, parameter_types)
            }
            Self::Regex(text) => StepTextPattern::regex(text),
        };
        compiled.map_err(|err| BindingError::InvalidExpression {
            method: method.to_string(),
            kind: self.kind(),
            expression: self.expression().unwrap_or(method.name()).to_string(),
            reason: err.to_string(),
        })
    }
}

impl fmt::Display for StepDefinitionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expression() {
            Some(text) => write!(f, "{} '{text}'", self.kind()),
            None => f.write_str(self.kind().as_str()),
        }
    }
}

/// Creates bindings from declarations.
///
/// # Examples
///
/// ```
/// use stepbind::{BindingFactory, StepDefinitionBuilder};
///
/// let factory = BindingFactory::new(true);
/// assert_eq!(factory.select_builder(None), StepDefinitionBuilder::MethodName);
/// assert_eq!(
///     factory.select_builder(Some("I have {int} cukes")),
///     StepDefinitionBuilder::CucumberExpression("I have {int} cukes".into())
/// );
/// assert_eq!(
///     BindingFactory::new(false).select_builder(Some("I have {int} cukes")),
///     StepDefinitionBuilder::Regex("I have {int} cukes".into())
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingFactory {
    cucumber_expressions_enabled: bool,
}

impl Default for BindingFactory {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BindingFactory {
    /// Create a factory; `cucumber_expressions_enabled` controls whether
    /// expression-like text is compiled as a Cucumber Expression.
    #[must_use]
    pub const fn new(cucumber_expressions_enabled: bool) -> Self {
        Self {
            cucumber_expressions_enabled,
        }
    }

    /// Returns `true` when Cucumber Expressions are recognised.
    #[must_use]
    pub const fn cucumber_expressions_enabled(&self) -> bool {
        self.cucumber_expressions_enabled
    }

    /// Choose the builder for an optional expression.
    #[must_use]
    pub fn select_builder(&self, expression: Option<&str>) -> StepDefinitionBuilder {
        match expression {
            None => StepDefinitionBuilder::MethodName,
            Some(text) if self.cucumber_expressions_enabled && is_cucumber_expression(text) => {
                StepDefinitionBuilder::CucumberExpression(text.to_string())
            }
            Some(text) => StepDefinitionBuilder::Regex(text.to_string()),
        }
    }

    /// Build a step definition binding.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::InvalidScope`] for malformed tag expressions
    /// and [`BindingError::InvalidExpression`] when the pattern fails to
    /// compile.
    pub fn create_step_definition(
        &self,
        step_type: StepDefinitionType,
        expression: Option<&str>,
        scope: BindingScope,
        method: Arc<BindingMethod>,
        parameter_types: &dyn ParameterTypeLookup,
    ) -> Result<StepDefinitionBinding, BindingError> {
        check_scope(&scope, &method)?;
        let pattern = self
            .select_builder(expression)
            .build(&method, parameter_types)?;
        Ok(StepDefinitionBinding::new(step_type, pattern, scope, method))
    }

    /// Build an invalid placeholder for a step definition that failed,
    /// keeping it visible to diagnostics.
    #[must_use]
    pub fn invalid_step_definition(
        &self,
        step_type: StepDefinitionType,
        expression: Option<&str>,
        scope: BindingScope,
        method: Arc<BindingMethod>,
        error: &BindingError,
    ) -> StepDefinitionBinding {
        let kind = self.select_builder(expression).kind();
        StepDefinitionBinding::invalid(
            step_type,
            expression,
            kind,
            scope,
            method,
            error.to_string(),
        )
    }

    /// Build a hook binding; `order` defaults to [`DEFAULT_ORDER`].
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::InvalidScope`] for malformed tag expressions.
    pub fn create_hook(
        &self,
        hook_type: HookType,
        order: Option<i32>,
        scope: BindingScope,
        method: Arc<BindingMethod>,
    ) -> Result<HookBinding, BindingError> {
        check_scope(&scope, &method)?;
        Ok(HookBinding::new(
            hook_type,
            order.unwrap_or(DEFAULT_ORDER),
            scope,
            method,
        ))
    }

    /// Build a step argument transformation; the regex is anchored to the
    /// whole input.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::MissingReturnType`] when the method returns
    /// nothing and [`BindingError::InvalidTransformationRegex`] when the
    /// regex fails to compile.
    pub fn create_transformation(
        &self,
        name: Option<&str>,
        regex: Option<&str>,
        order: Option<i32>,
        method: Arc<BindingMethod>,
    ) -> Result<StepArgumentTransformationBinding, BindingError> {
        if method.return_type().is_none() {
            return Err(BindingError::MissingReturnType {
                method: method.to_string(),
            });
        }
        let compiled = regex
            .map(|source| {
                compile_anchored(source)
                    .map(|compiled| (source.to_string(), compiled))
                    .map_err(|err| BindingError::InvalidTransformationRegex {
                        method: method.to_string(),
                        regex: source.to_string(),
                        reason: err.to_string(),
                    })
            })
            .transpose()?;
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(StepArgumentTransformationBinding::new(
            name,
            compiled,
            order.unwrap_or(DEFAULT_ORDER),
            method,
        ))
    }
}

fn check_scope(scope: &BindingScope, method: &BindingMethod) -> Result<(), BindingError> {
    match scope.error() {
        Some(reason) => Err(BindingError::InvalidScope {
            method: method.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
