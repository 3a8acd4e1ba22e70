//! Runtime configuration.
//!
//! [`RuntimeConfig`] carries the settings consulted while building bindings
//! and executing steps. Values come from code through the `with_*` builders
//! or from `STEPBIND_*` environment variables via [`RuntimeConfig::from_env`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::culture::BindingCulture;

/// Default bound on nested transformation applications.
pub const DEFAULT_MAX_TRANSFORMATION_DEPTH: usize = 32;

const CUCUMBER_EXPRESSIONS_VAR: &str = "STEPBIND_CUCUMBER_EXPRESSIONS";
const DRY_RUN_VAR: &str = "STEPBIND_DRY_RUN";
const CULTURE_VAR: &str = "STEPBIND_CULTURE";
const OBSOLETE_BEHAVIOR_VAR: &str = "STEPBIND_OBSOLETE_BEHAVIOR";
const MAX_DEPTH_VAR: &str = "STEPBIND_MAX_TRANSFORMATION_DEPTH";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A variable holds a value that cannot be interpreted.
    #[error("invalid value '{value}' for {variable}")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// Offending value.
        value: String,
    },
    /// The culture name is not one of the known presets.
    #[error("unknown culture '{0}'")]
    UnknownCulture(String),
}

/// What the executor does when a matched step is obsolete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ObsoleteBehavior {
    /// Run the step without comment.
    None,
    /// Log a warning and run the step.
    #[default]
    Warn,
    /// Report the step as pending without running it.
    Pending,
    /// Fail the step.
    Error,
}

impl ObsoleteBehavior {
    /// Configuration spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Warn => "warn",
            Self::Pending => "pending",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ObsoleteBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObsoleteBehavior {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "warn" => Ok(Self::Warn),
            "pending" => Ok(Self::Pending),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidValue {
                variable: OBSOLETE_BEHAVIOR_VAR,
                value: s.to_string(),
            }),
        }
    }
}

/// Settings shared by discovery, matching and execution.
///
/// # Examples
///
/// ```
/// use stepbind::{ObsoleteBehavior, RuntimeConfig};
///
/// let config = RuntimeConfig::default()
///     .with_dry_run(true)
///     .with_obsolete_behavior(ObsoleteBehavior::Error);
/// assert!(config.cucumber_expressions_enabled());
/// assert!(config.dry_run());
/// assert_eq!(config.max_transformation_depth(), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    cucumber_expressions_enabled: bool,
    culture: BindingCulture,
    max_transformation_depth: usize,
    obsolete_behavior: ObsoleteBehavior,
    dry_run: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cucumber_expressions_enabled: true,
            culture: BindingCulture::invariant(),
            max_transformation_depth: DEFAULT_MAX_TRANSFORMATION_DEPTH,
            obsolete_behavior: ObsoleteBehavior::default(),
            dry_run: false,
        }
    }
}

impl RuntimeConfig {
    /// Overlay `STEPBIND_*` environment variables on the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Overlay variables resolved by `lookup` on the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first malformed variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(CUCUMBER_EXPRESSIONS_VAR) {
            config.cucumber_expressions_enabled = env_bool(CUCUMBER_EXPRESSIONS_VAR, &value)?;
        }
        if let Some(value) = lookup(DRY_RUN_VAR) {
            config.dry_run = env_bool(DRY_RUN_VAR, &value)?;
        }
        if let Some(value) = lookup(CULTURE_VAR) {
            config.culture = BindingCulture::from_name(&value)
                .ok_or_else(|| ConfigError::UnknownCulture(value.clone()))?;
        }
        if let Some(value) = lookup(OBSOLETE_BEHAVIOR_VAR) {
            config.obsolete_behavior = value.parse()?;
        }
        if let Some(value) = lookup(MAX_DEPTH_VAR) {
            config.max_transformation_depth = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|depth| *depth > 0)
                .ok_or(ConfigError::InvalidValue {
                    variable: MAX_DEPTH_VAR,
                    value,
                })?;
        }
        Ok(config)
    }

    /// Enable or disable Cucumber Expression recognition.
    #[must_use]
    pub fn with_cucumber_expressions(mut self, enabled: bool) -> Self {
        self.cucumber_expressions_enabled = enabled;
        self
    }

    /// Set the culture used by simple conversion.
    #[must_use]
    pub fn with_culture(mut self, culture: BindingCulture) -> Self {
        self.culture = culture;
        self
    }

    /// Bound nested transformation applications.
    #[must_use]
    pub fn with_max_transformation_depth(mut self, depth: usize) -> Self {
        self.max_transformation_depth = depth.max(1);
        self
    }

    /// Choose how obsolete steps are treated.
    #[must_use]
    pub fn with_obsolete_behavior(mut self, behavior: ObsoleteBehavior) -> Self {
        self.obsolete_behavior = behavior;
        self
    }

    /// Match steps without converting arguments or running user code.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether expression-like step text compiles as a Cucumber Expression.
    #[must_use]
    pub const fn cucumber_expressions_enabled(&self) -> bool {
        self.cucumber_expressions_enabled
    }

    /// Culture used by simple conversion.
    #[must_use]
    pub const fn culture(&self) -> &BindingCulture {
        &self.culture
    }

    /// Bound on nested transformation applications.
    #[must_use]
    pub const fn max_transformation_depth(&self) -> usize {
        self.max_transformation_depth
    }

    /// Treatment of obsolete steps.
    #[must_use]
    pub const fn obsolete_behavior(&self) -> ObsoleteBehavior {
        self.obsolete_behavior
    }

    /// Whether user code is skipped.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }
}

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_bool(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    parse_env_bool(value).ok_or_else(|| ConfigError::InvalidValue {
        variable,
        value: value.to_string(),
    })
}
