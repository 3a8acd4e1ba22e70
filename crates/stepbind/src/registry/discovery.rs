//! Explicit binding discovery.
//!
//! Discovery collects plain descriptor records, from code or from
//! [`inventory`] submissions, and turns them into bindings in one pass.
//! A descriptor that fails to build is recorded as a binding error and the
//! remaining descriptors still register.

use std::sync::Arc;

use stepbind_patterns::StepDefinitionType;

use super::{BindingRegistry, RegistryError};
use crate::binding::{HookType, SourceLocation};
use crate::config::RuntimeConfig;
use crate::factory::BindingFactory;
use crate::method::BindingMethod;
use crate::parameter_types::CucumberParameterTypes;
use crate::scope::BindingScope;

/// Scope criteria as declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeDescriptor {
    /// Tag expression, such as `@web and not @slow`.
    pub tag: Option<String>,
    /// Feature title the binding is limited to.
    pub feature_title: Option<String>,
    /// Scenario title the binding is limited to.
    pub scenario_title: Option<String>,
}

impl ScopeDescriptor {
    /// Restrict to a tag expression.
    #[must_use]
    pub fn tag(mut self, expression: impl Into<String>) -> Self {
        self.tag = Some(expression.into());
        self
    }

    /// Restrict to a feature title.
    #[must_use]
    pub fn feature(mut self, title: impl Into<String>) -> Self {
        self.feature_title = Some(title.into());
        self
    }

    /// Restrict to a scenario title.
    #[must_use]
    pub fn scenario(mut self, title: impl Into<String>) -> Self {
        self.scenario_title = Some(title.into());
        self
    }

    fn to_scope(&self) -> BindingScope {
        BindingScope::new(
            self.tag.as_deref(),
            self.feature_title.as_deref(),
            self.scenario_title.as_deref(),
        )
    }
}

/// A step definition declaration.
#[derive(Debug, Clone)]
pub struct StepDefinitionDescriptor {
    /// Step types the method answers; one binding is built per type.
    pub step_types: Vec<StepDefinitionType>,
    /// Regex or Cucumber Expression; `None` derives the pattern from the
    /// method name.
    pub expression: Option<String>,
    /// Scope criteria.
    pub scope: ScopeDescriptor,
    /// Method to invoke.
    pub method: Arc<BindingMethod>,
    /// Declaration site.
    pub location: Option<SourceLocation>,
}

impl StepDefinitionDescriptor {
    /// Declare `method` for `step_types`.
    #[must_use]
    pub fn new(
        step_types: &[StepDefinitionType],
        expression: Option<&str>,
        method: BindingMethod,
    ) -> Self {
        Self {
            step_types: step_types.to_vec(),
            expression: expression.map(str::to_string),
            scope: ScopeDescriptor::default(),
            method: Arc::new(method),
            location: None,
        }
    }

    /// Declare a `Given` step.
    #[must_use]
    pub fn given(expression: Option<&str>, method: BindingMethod) -> Self {
        Self::new(&[StepDefinitionType::Given], expression, method)
    }

    /// Declare a `When` step.
    #[must_use]
    pub fn when(expression: Option<&str>, method: BindingMethod) -> Self {
        Self::new(&[StepDefinitionType::When], expression, method)
    }

    /// Declare a `Then` step.
    #[must_use]
    pub fn then(expression: Option<&str>, method: BindingMethod) -> Self {
        Self::new(&[StepDefinitionType::Then], expression, method)
    }

    /// Declare a step answering every step type.
    #[must_use]
    pub fn any(expression: Option<&str>, method: BindingMethod) -> Self {
        Self::new(&StepDefinitionType::ALL, expression, method)
    }

    /// Attach scope criteria.
    #[must_use]
    pub fn scoped(mut self, scope: ScopeDescriptor) -> Self {
        self.scope = scope;
        self
    }

    /// Record the declaration site.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// A hook declaration.
#[derive(Debug, Clone)]
pub struct HookDescriptor {
    /// Lifecycle point.
    pub hook_type: HookType,
    /// Execution order; the default order applies when `None`.
    pub order: Option<i32>,
    /// Scope criteria.
    pub scope: ScopeDescriptor,
    /// Method to invoke.
    pub method: Arc<BindingMethod>,
    /// Declaration site.
    pub location: Option<SourceLocation>,
}

impl HookDescriptor {
    /// Declare `method` as a hook.
    #[must_use]
    pub fn new(hook_type: HookType, method: BindingMethod) -> Self {
        Self {
            hook_type,
            order: None,
            scope: ScopeDescriptor::default(),
            method: Arc::new(method),
            location: None,
        }
    }

    /// Set the execution order.
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Attach scope criteria.
    #[must_use]
    pub fn scoped(mut self, scope: ScopeDescriptor) -> Self {
        self.scope = scope;
        self
    }

    /// Record the declaration site.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// A step argument transformation declaration.
#[derive(Debug, Clone)]
pub struct TransformationDescriptor {
    /// Parameter type name for Cucumber Expressions.
    pub name: Option<String>,
    /// Regex restricting which text inputs apply.
    pub regex: Option<String>,
    /// Tie-break order; the default order applies when `None`.
    pub order: Option<i32>,
    /// Method producing the output value.
    pub method: Arc<BindingMethod>,
    /// Declaration site.
    pub location: Option<SourceLocation>,
}

impl TransformationDescriptor {
    /// Declare `method` as a transformation restricted by `regex`.
    #[must_use]
    pub fn new(regex: Option<&str>, method: BindingMethod) -> Self {
        Self {
            name: None,
            regex: regex.map(str::to_string),
            order: None,
            method: Arc::new(method),
            location: None,
        }
    }

    /// Name the transformation as a Cucumber Expression parameter type.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the tie-break order.
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Record the declaration site.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Registration builder collecting binding declarations.
///
/// # Examples
///
/// ```
/// use stepbind::{
///     BindingDiscovery, BindingMethod, RuntimeConfig, StepDefinitionDescriptor,
///     StepDefinitionType,
/// };
///
/// let mut discovery = BindingDiscovery::new();
/// discovery.step(StepDefinitionDescriptor::when(
///     Some("I add {int} and {int}"),
///     BindingMethod::sync("Calculator", "add", |_, _| Ok(None))
///         .with_parameter::<i32>("a")
///         .with_parameter::<i32>("b"),
/// ));
/// let registry = discovery.build(&RuntimeConfig::default());
/// assert!(registry.is_ready());
/// assert_eq!(
///     registry
///         .get_considered_step_definitions(StepDefinitionType::When, None)
///         .count(),
///     1
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct BindingDiscovery {
    steps: Vec<StepDefinitionDescriptor>,
    hooks: Vec<HookDescriptor>,
    transformations: Vec<TransformationDescriptor>,
}

impl BindingDiscovery {
    /// Start an empty discovery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every [`BindingSubmission`] linked into the binary.
    #[must_use]
    pub fn from_inventory() -> Self {
        let mut discovery = Self::new();
        for submission in inventory::iter::<BindingSubmission> {
            (submission.register)(&mut discovery);
        }
        discovery
    }

    /// Declare a step definition.
    pub fn step(&mut self, descriptor: StepDefinitionDescriptor) -> &mut Self {
        self.steps.push(descriptor);
        self
    }

    /// Declare a hook.
    pub fn hook(&mut self, descriptor: HookDescriptor) -> &mut Self {
        self.hooks.push(descriptor);
        self
    }

    /// Declare a step argument transformation.
    pub fn transformation(&mut self, descriptor: TransformationDescriptor) -> &mut Self {
        self.transformations.push(descriptor);
        self
    }

    /// Number of declarations collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len() + self.hooks.len() + self.transformations.len()
    }

    /// Returns `true` when nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build bindings into `registry` and mark it ready.
    ///
    /// Transformations register first so Cucumber Expressions can refer to
    /// them as parameter types.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the registry is already ready.
    pub fn register_into(
        &self,
        registry: &mut BindingRegistry,
        config: &RuntimeConfig,
    ) -> Result<(), RegistryError> {
        let factory = BindingFactory::new(config.cucumber_expressions_enabled());

        for descriptor in &self.transformations {
            match factory.create_transformation(
                descriptor.name.as_deref(),
                descriptor.regex.as_deref(),
                descriptor.order,
                Arc::clone(&descriptor.method),
            ) {
                Ok(transformation) => registry.register_step_argument_transformation(
                    transformation.with_location(descriptor.location),
                )?,
                Err(err) => registry.register_generic_binding_error(err)?,
            }
        }

        let parameter_types = CucumberParameterTypes::new(
            registry.get_step_transformations().iter().map(Arc::as_ref),
            self.steps.iter().flat_map(|descriptor| {
                descriptor
                    .method
                    .parameters()
                    .iter()
                    .map(|parameter| parameter.binding_type())
            }),
        );

        for descriptor in &self.hooks {
            match factory.create_hook(
                descriptor.hook_type,
                descriptor.order,
                descriptor.scope.to_scope(),
                Arc::clone(&descriptor.method),
            ) {
                Ok(hook) => registry.register_hook(hook.with_location(descriptor.location))?,
                Err(err) => registry.register_generic_binding_error(err)?,
            }
        }

        for descriptor in &self.steps {
            let mut first_error = None;
            for step_type in &descriptor.step_types {
                let scope = descriptor.scope.to_scope();
                let binding = match factory.create_step_definition(
                    *step_type,
                    descriptor.expression.as_deref(),
                    scope.clone(),
                    Arc::clone(&descriptor.method),
                    &parameter_types,
                ) {
                    Ok(binding) => binding,
                    Err(err) => {
                        let binding = factory.invalid_step_definition(
                            *step_type,
                            descriptor.expression.as_deref(),
                            scope,
                            Arc::clone(&descriptor.method),
                            &err,
                        );
                        first_error.get_or_insert(err);
                        binding
                    }
                };
                registry.register_step_definition(binding.with_location(descriptor.location))?;
            }
            if let Some(err) = first_error {
                registry.register_generic_binding_error(err)?;
            }
        }

        registry.mark_ready()
    }

    /// Build a fresh, ready registry.
    #[must_use]
    pub fn build(&self, config: &RuntimeConfig) -> BindingRegistry {
        let mut registry = BindingRegistry::new();
        if let Err(err) = self.register_into(&mut registry, config) {
            log::warn!("binding discovery failed: {err}");
        }
        registry
    }
}

/// A static registration function collected through [`inventory`].
///
/// Submit one with [`bindings!`](crate::bindings).
#[derive(Debug)]
pub struct BindingSubmission {
    /// Adds declarations to the discovery.
    pub register: fn(&mut BindingDiscovery),
}

impl BindingSubmission {
    /// Wrap a registration function.
    #[must_use]
    pub const fn new(register: fn(&mut BindingDiscovery)) -> Self {
        Self { register }
    }
}

inventory::collect!(BindingSubmission);

/// Submit a registration function for
/// [`BindingDiscovery::from_inventory`](crate::BindingDiscovery::from_inventory).
///
/// # Examples
///
/// ```
/// use stepbind::{BindingDiscovery, BindingMethod, StepDefinitionDescriptor};
///
/// fn register(discovery: &mut BindingDiscovery) {
///     discovery.step(StepDefinitionDescriptor::given(
///         Some("an empty basket"),
///         BindingMethod::sync("Basket", "empty", |_, _| Ok(None)),
///     ));
/// }
///
/// stepbind::bindings!(register);
///
/// assert!(!BindingDiscovery::from_inventory().is_empty());
/// ```
#[macro_export]
macro_rules! bindings {
    ($register:path) => {
        $crate::submit! {
            $crate::BindingSubmission::new($register)
        }
    };
}
