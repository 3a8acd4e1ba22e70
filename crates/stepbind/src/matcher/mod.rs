//! Selecting the step definition for a step.
//!
//! Candidates of the step's effective type must match the whole step text,
//! satisfy their scope, and accept the step's arguments. Survivors are
//! ranked by how many scope criteria they satisfied; a tie at the top is
//! reported as ambiguous rather than resolved by discovery order.

use std::sync::Arc;

use crate::binding::StepDefinitionBinding;
use crate::converter::StepArgumentTypeConverter;
use crate::culture::BindingCulture;
use crate::invoker::DryRunBindingInvoker;
use crate::registry::BindingRegistry;
use crate::step::StepContext;
use crate::value::StepArgument;

mod outcome;

pub use outcome::{AmbiguityReason, BindingMatch, MatchArgument, MatchOutcome};

#[derive(Debug, Clone, Copy)]
struct MatchChecks {
    scope: bool,
    parameters: bool,
}

impl MatchChecks {
    const ALL: Self = Self {
        scope: true,
        parameters: true,
    };
    const WITHOUT_SCOPE: Self = Self {
        scope: false,
        parameters: true,
    };
    const WITHOUT_PARAMETERS: Self = Self {
        scope: true,
        parameters: false,
    };
}

/// Matches steps against a registry. Holds no state between calls.
///
/// # Examples
///
/// ```
/// use stepbind::{
///     BindingCulture, BindingDiscovery, BindingMatchEngine, BindingMethod, RuntimeConfig,
///     StepContext, StepDefinitionDescriptor, StepDefinitionType,
/// };
///
/// let mut discovery = BindingDiscovery::new();
/// discovery.step(StepDefinitionDescriptor::when(
///     Some(r"I add (\d+) and (\d+)"),
///     BindingMethod::sync("Calculator", "add", |_, _| Ok(None))
///         .with_parameter::<i32>("a")
///         .with_parameter::<i32>("b"),
/// ));
/// let registry = discovery.build(&RuntimeConfig::default());
/// let engine = BindingMatchEngine::new(&registry);
/// let culture = BindingCulture::invariant();
///
/// let step = StepContext::new(StepDefinitionType::When, "I add 2 and 3");
/// let found = engine.get_best_match(&step, &culture).into_match().expect("match");
/// assert_eq!(found.arguments().len(), 2);
///
/// let step = StepContext::new(StepDefinitionType::When, "I add 2 and three");
/// assert!(!engine.get_best_match(&step, &culture).is_match());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BindingMatchEngine<'r> {
    registry: &'r BindingRegistry,
    converter: StepArgumentTypeConverter<'r>,
}

impl<'r> BindingMatchEngine<'r> {
    /// Create an engine over `registry`.
    #[must_use]
    pub fn new(registry: &'r BindingRegistry) -> Self {
        Self {
            registry,
            converter: StepArgumentTypeConverter::new(registry, &DryRunBindingInvoker),
        }
    }

    /// Select the binding for `step`.
    ///
    /// When no candidate passes every check the engine retries without the
    /// scope check, to report scope exclusions, and then without the
    /// parameter check: a single text match is still returned so that
    /// conversion reports the real problem when the step runs.
    #[must_use]
    pub fn get_best_match(&self, step: &StepContext, culture: &BindingCulture) -> MatchOutcome {
        let matches = self.get_matches(step, culture, MatchChecks::ALL);
        let outcome = if matches.is_empty() {
            self.explain_missing_match(step, culture)
        } else {
            rank(matches)
        };
        log_outcome(step, &outcome);
        outcome
    }

    fn explain_missing_match(&self, step: &StepContext, culture: &BindingCulture) -> MatchOutcome {
        let scope_excluded = self.get_matches(step, culture, MatchChecks::WITHOUT_SCOPE);
        if !scope_excluded.is_empty() {
            return MatchOutcome::NoMatch {
                scope_excluded: true,
                candidates: scope_excluded,
            };
        }
        let text_only = self.get_matches(step, culture, MatchChecks::WITHOUT_PARAMETERS);
        if text_only.is_empty() {
            return MatchOutcome::NoMatch {
                scope_excluded: false,
                candidates: text_only,
            };
        }
        match <[BindingMatch; 1]>::try_from(text_only) {
            Ok([found]) => MatchOutcome::Matched(found),
            Err(candidates) => MatchOutcome::Ambiguous {
                reason: AmbiguityReason::ParameterErrors,
                candidates,
            },
        }
    }

    fn get_matches(
        &self,
        step: &StepContext,
        culture: &BindingCulture,
        checks: MatchChecks,
    ) -> Vec<BindingMatch> {
        let mut matches: Vec<BindingMatch> = Vec::new();
        for binding in self
            .registry
            .get_considered_step_definitions(step.step_type(), Some(step.text()))
        {
            let candidate = self.match_binding(binding, step, culture, checks);
            if !candidate.success() {
                continue;
            }
            // Several bindings on one method count as one candidate.
            let previous = matches.iter_mut().find(|existing| {
                existing
                    .binding()
                    .is_some_and(|existing| same_method(existing, binding))
            });
            match previous {
                Some(existing) => {
                    if candidate.scope_match_count() > existing.scope_match_count() {
                        *existing = candidate;
                    }
                }
                None => matches.push(candidate),
            }
        }
        matches
    }

    fn match_binding(
        &self,
        binding: &Arc<StepDefinitionBinding>,
        step: &StepContext,
        culture: &BindingCulture,
        checks: MatchChecks,
    ) -> BindingMatch {
        let Some(pattern) = binding.pattern() else {
            return BindingMatch::NON_MATCHING;
        };
        let Some(captures) = pattern.captures(step.text()) else {
            log::trace!("{binding} does not match '{}'", step.text());
            return BindingMatch::NON_MATCHING;
        };
        let scope_match_count = if checks.scope && binding.is_scoped() {
            let Some(count) = binding.scope().matches(&step.scope_context()) else {
                log::trace!("{binding} is out of scope for '{}'", step.text());
                return BindingMatch::NON_MATCHING;
            };
            count
        } else {
            0
        };
        let mut arguments: Vec<MatchArgument> = captures
            .into_iter()
            .map(|capture| MatchArgument {
                value: StepArgument::Text(capture.value),
                start_offset: capture.start,
            })
            .collect();
        if let Some(argument) = step.argument() {
            arguments.push(MatchArgument {
                value: argument.clone(),
                start_offset: None,
            });
        }
        if checks.parameters && !self.accepts_arguments(binding, &arguments, culture) {
            log::trace!("{binding} cannot take the arguments of '{}'", step.text());
            return BindingMatch::NON_MATCHING;
        }
        BindingMatch::new(Arc::clone(binding), scope_match_count, arguments)
    }

    fn accepts_arguments(
        &self,
        binding: &StepDefinitionBinding,
        arguments: &[MatchArgument],
        culture: &BindingCulture,
    ) -> bool {
        let parameters = binding.method().parameters();
        parameters.len() == arguments.len()
            && arguments.iter().zip(parameters).all(|(argument, parameter)| {
                self.converter.can_convert(
                    &argument.value.clone().into_value(),
                    parameter.binding_type(),
                    culture,
                )
            })
    }
}

fn same_method(left: &StepDefinitionBinding, right: &StepDefinitionBinding) -> bool {
    Arc::ptr_eq(left.method(), right.method())
        || left.method().to_string() == right.method().to_string()
}

fn rank(mut matches: Vec<BindingMatch>) -> MatchOutcome {
    let best = matches
        .iter()
        .map(BindingMatch::scope_match_count)
        .max()
        .unwrap_or_default();
    matches.retain(|candidate| candidate.scope_match_count() == best);
    match <[BindingMatch; 1]>::try_from(matches) {
        Ok([found]) => MatchOutcome::Matched(found),
        Err(candidates) => MatchOutcome::Ambiguous {
            reason: AmbiguityReason::Steps,
            candidates,
        },
    }
}

fn log_outcome(step: &StepContext, outcome: &MatchOutcome) {
    match outcome {
        MatchOutcome::Matched(found) => {
            log::debug!("{} '{}' matched {found}", step.step_type(), step.text());
        }
        MatchOutcome::Ambiguous { reason, candidates } => log::debug!(
            "{} '{}' is ambiguous ({reason}): {}",
            step.step_type(),
            step.text(),
            candidates
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        ),
        MatchOutcome::NoMatch { scope_excluded, .. } => log::debug!(
            "{} '{}' has no matching step definition{}",
            step.step_type(),
            step.text(),
            if *scope_excluded { " in scope" } else { "" }
        ),
    }
}
