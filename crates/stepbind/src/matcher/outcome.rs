//! Match results.

use std::fmt;
use std::sync::Arc;

use crate::binding::StepDefinitionBinding;
use crate::method::Obsoletion;
use crate::value::StepArgument;

/// One argument extracted by a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchArgument {
    /// Captured text, doc string or table.
    pub value: StepArgument,
    /// Character offset of captured text in the step; `None` for doc
    /// strings, tables and groups that did not participate.
    pub start_offset: Option<usize>,
}

/// A step definition selected for a step, with its arguments.
#[derive(Debug, Clone)]
pub struct BindingMatch {
    binding: Option<Arc<StepDefinitionBinding>>,
    scope_match_count: usize,
    arguments: Vec<MatchArgument>,
}

impl BindingMatch {
    /// The unsuccessful match.
    pub const NON_MATCHING: Self = Self {
        binding: None,
        scope_match_count: 0,
        arguments: Vec::new(),
    };

    /// A successful match.
    #[must_use]
    pub fn new(
        binding: Arc<StepDefinitionBinding>,
        scope_match_count: usize,
        arguments: Vec<MatchArgument>,
    ) -> Self {
        Self {
            binding: Some(binding),
            scope_match_count,
            arguments,
        }
    }

    /// Returns `true` when a binding was selected.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.binding.is_some()
    }

    /// The selected binding.
    #[must_use]
    pub fn binding(&self) -> Option<&Arc<StepDefinitionBinding>> {
        self.binding.as_ref()
    }

    /// Number of scope criteria the step satisfied.
    #[must_use]
    pub const fn scope_match_count(&self) -> usize {
        self.scope_match_count
    }

    /// Arguments in parameter order: captures first, then any doc string or
    /// table.
    #[must_use]
    pub fn arguments(&self) -> &[MatchArgument] {
        &self.arguments
    }

    /// Take the arguments.
    #[must_use]
    pub fn into_arguments(self) -> Vec<MatchArgument> {
        self.arguments
    }

    /// Returns `true` when the bound method is marked obsolete.
    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        self.obsoletion().is_some()
    }

    /// Obsoletion details of the bound method.
    #[must_use]
    pub fn obsoletion(&self) -> Option<&Obsoletion> {
        self.binding
            .as_ref()
            .and_then(|binding| binding.method().obsoletion())
    }
}

impl fmt::Display for BindingMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some(binding) => write!(f, "{binding}"),
            None => f.write_str("no match"),
        }
    }
}

/// Why several bindings remained after ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityReason {
    /// Several bindings match equally well.
    Steps,
    /// No binding fits the arguments and several match the text.
    ParameterErrors,
}

impl fmt::Display for AmbiguityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Steps => "multiple step definitions match",
            Self::ParameterErrors => {
                "multiple step definitions match the text but none accepts the arguments"
            }
        })
    }
}

/// Result of selecting a binding for a step.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// Exactly one binding was selected.
    Matched(BindingMatch),
    /// More than one binding ranked first.
    Ambiguous {
        /// Why the tie could not be broken.
        reason: AmbiguityReason,
        /// Every tied candidate.
        candidates: Vec<BindingMatch>,
    },
    /// No binding applies.
    NoMatch {
        /// Returns `true` when bindings matched the text but their scopes
        /// excluded the step.
        scope_excluded: bool,
        /// The scope-excluded candidates.
        candidates: Vec<BindingMatch>,
    },
}

impl MatchOutcome {
    /// The selected match, if any.
    #[must_use]
    pub fn into_match(self) -> Option<BindingMatch> {
        match self {
            Self::Matched(found) => Some(found),
            Self::Ambiguous { .. } | Self::NoMatch { .. } => None,
        }
    }

    /// Returns `true` for [`MatchOutcome::Matched`].
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Candidates worth naming in diagnostics.
    #[must_use]
    pub fn candidates(&self) -> &[BindingMatch] {
        match self {
            Self::Matched(found) => std::slice::from_ref(found),
            Self::Ambiguous { candidates, .. } | Self::NoMatch { candidates, .. } => candidates,
        }
    }
}
