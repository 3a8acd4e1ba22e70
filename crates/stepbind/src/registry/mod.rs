//! The binding registry: the catalogue of step definitions, hooks and
//! argument transformations consulted during a run.
//!
//! A registry is filled during a single-threaded discovery phase, then
//! marked ready and shared read-only (typically behind an `Arc`) by every
//! scenario. Registration after readiness is rejected.

use std::sync::Arc;

use hashbrown::HashMap;
use stepbind_patterns::StepDefinitionType;
use thiserror::Error;

use crate::binding::{
    HookBinding, HookType, StepArgumentTransformationBinding, StepDefinitionBinding,
};
use crate::factory::BindingError;

#[cfg(feature = "diagnostics")]
mod diagnostics;
mod discovery;
mod ready;

pub use discovery::{
    BindingDiscovery, BindingSubmission, HookDescriptor, ScopeDescriptor,
    StepDefinitionDescriptor, TransformationDescriptor,
};
pub use ready::ReadySignal;

/// Errors raised by registry mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// A binding arrived after the registry was marked ready.
    #[error("cannot register {kind} after the binding registry is ready")]
    RegistrationAfterReady {
        /// What was being registered.
        kind: &'static str,
    },
    /// The registry was marked ready twice.
    #[error("the binding registry is already ready")]
    AlreadyReady,
}

/// Catalogue of bindings.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    step_definitions: HashMap<StepDefinitionType, Vec<Arc<StepDefinitionBinding>>>,
    hooks: Vec<Arc<HookBinding>>,
    transformations: Vec<Arc<StepArgumentTransformationBinding>>,
    errors: Vec<BindingError>,
    ready: ReadySignal,
}

impl BindingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self, kind: &'static str) -> Result<(), RegistryError> {
        if self.ready.is_ready() {
            log::warn!("rejected {kind} registration: the binding registry is already ready");
            return Err(RegistryError::RegistrationAfterReady { kind });
        }
        Ok(())
    }

    /// Add a step definition. Invalid bindings are kept for diagnostics but
    /// never offered to the matcher.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RegistrationAfterReady`] once the registry is
    /// ready.
    pub fn register_step_definition(
        &mut self,
        binding: StepDefinitionBinding,
    ) -> Result<(), RegistryError> {
        self.ensure_open("step definition")?;
        self.step_definitions
            .entry(binding.step_type())
            .or_default()
            .push(Arc::new(binding));
        Ok(())
    }

    /// Add a hook.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RegistrationAfterReady`] once the registry is
    /// ready.
    pub fn register_hook(&mut self, hook: HookBinding) -> Result<(), RegistryError> {
        self.ensure_open("hook")?;
        self.hooks.push(Arc::new(hook));
        Ok(())
    }

    /// Add a step argument transformation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RegistrationAfterReady`] once the registry is
    /// ready.
    pub fn register_step_argument_transformation(
        &mut self,
        transformation: StepArgumentTransformationBinding,
    ) -> Result<(), RegistryError> {
        self.ensure_open("step argument transformation")?;
        self.transformations.push(Arc::new(transformation));
        Ok(())
    }

    /// Record a discovery error without aborting discovery.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RegistrationAfterReady`] once the registry is
    /// ready.
    pub fn register_generic_binding_error(
        &mut self,
        error: BindingError,
    ) -> Result<(), RegistryError> {
        self.ensure_open("binding error")?;
        log::warn!("binding error: {error}");
        self.errors.push(error);
        Ok(())
    }

    /// Signal that discovery is complete.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyReady`] on a second call.
    pub fn mark_ready(&self) -> Result<(), RegistryError> {
        if self.ready.fire() {
            log::debug!(
                "binding registry ready: {} step definitions, {} hooks, {} transformations, {} errors",
                self.step_definitions().count(),
                self.hooks.len(),
                self.transformations.len(),
                self.errors.len()
            );
            Ok(())
        } else {
            Err(RegistryError::AlreadyReady)
        }
    }

    /// Returns `true` once discovery is complete.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Handle for waiting on readiness from other threads.
    #[must_use]
    pub fn ready_signal(&self) -> ReadySignal {
        self.ready.clone()
    }

    /// Valid step definitions for `step_type`, in registration order.
    ///
    /// When `step_text` is given, bindings whose pattern has a literal prefix
    /// the text does not start with are skipped.
    pub fn get_considered_step_definitions<'a>(
        &'a self,
        step_type: StepDefinitionType,
        step_text: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Arc<StepDefinitionBinding>> {
        self.step_definitions
            .get(&step_type)
            .into_iter()
            .flatten()
            .filter(|binding| binding.is_valid())
            .filter(move |binding| match (step_text, binding.pattern()) {
                (Some(text), Some(pattern)) => pattern
                    .literal_prefix()
                    .is_none_or(|prefix| text.starts_with(prefix)),
                _ => true,
            })
    }

    /// Every step definition, valid or not, grouped by step type.
    pub fn step_definitions(&self) -> impl Iterator<Item = &Arc<StepDefinitionBinding>> {
        StepDefinitionType::ALL
            .iter()
            .filter_map(|step_type| self.step_definitions.get(step_type))
            .flatten()
    }

    /// Hooks, optionally of one type, ordered by ascending order with ties
    /// kept in registration order.
    #[must_use]
    pub fn get_hooks(&self, hook_type: Option<HookType>) -> Vec<&Arc<HookBinding>> {
        let mut hooks: Vec<_> = self
            .hooks
            .iter()
            .filter(|hook| hook_type.is_none_or(|wanted| hook.hook_type() == wanted))
            .collect();
        hooks.sort_by_key(|hook| hook.order());
        hooks
    }

    /// Every registered transformation, in registration order.
    #[must_use]
    pub fn get_step_transformations(&self) -> &[Arc<StepArgumentTransformationBinding>] {
        &self.transformations
    }

    /// Accumulated discovery errors.
    #[must_use]
    pub fn errors(&self) -> &[BindingError] {
        &self.errors
    }

    /// Serialize the registry contents to JSON for tooling.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[cfg(feature = "diagnostics")]
    pub fn dump(&self) -> serde_json::Result<String> {
        diagnostics::dump(self)
    }
}
