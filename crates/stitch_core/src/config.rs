//! Composition configuration surface.
//!
//! # Responsibility
//! - Hold the settings the configuration-loading collaborator hands to the
//!   resolution pipeline: naming postfix, search scope, collision policy.
//!
//! # Invariants
//! - Configuration is validated before any resolution starts; invalid
//!   settings never reach the locator.

use crate::model::fragment::{is_valid_package, is_valid_type_name};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default implementation-type naming postfix.
pub const DEFAULT_NAMING_POSTFIX: &str = "Impl";

/// Settings for one composition run.
///
/// Per-repository settings (explicit component-name override, base
/// implementation override) live on the repository declaration and the
/// composer call instead; this struct covers the shared knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionConfig {
    /// Implementation naming convention postfix, default `Impl`.
    pub naming_postfix: String,
    /// Package path bounding implementation discovery.
    pub search_scope: String,
    /// When true, same-tier method collisions fail the build.
    pub strict_collisions: bool,
}

impl CompositionConfig {
    /// Creates a config for `search_scope` with default postfix and lenient
    /// collision policy.
    pub fn for_scope(search_scope: impl Into<String>) -> Self {
        Self {
            naming_postfix: DEFAULT_NAMING_POSTFIX.to_string(),
            search_scope: search_scope.into(),
            strict_collisions: false,
        }
    }

    /// Replaces the naming postfix.
    pub fn with_naming_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.naming_postfix = postfix.into();
        self
    }

    /// Enables strict same-tier collision detection.
    pub fn with_strict_collisions(mut self) -> Self {
        self.strict_collisions = true;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.naming_postfix.trim().is_empty() {
            return Err(ConfigError::EmptyPostfix);
        }
        if !is_valid_type_name(&self.naming_postfix) {
            return Err(ConfigError::InvalidPostfix(self.naming_postfix.clone()));
        }
        if self.search_scope.trim().is_empty() {
            return Err(ConfigError::EmptyScope);
        }
        if !is_valid_package(&self.search_scope) {
            return Err(ConfigError::InvalidScope(self.search_scope.clone()));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyPostfix,
    InvalidPostfix(String),
    EmptyScope,
    InvalidScope(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPostfix => write!(f, "naming postfix must not be empty"),
            Self::InvalidPostfix(value) => {
                write!(f, "naming postfix must be an UpperCamel suffix: {value}")
            }
            Self::EmptyScope => write!(f, "search scope must not be empty"),
            Self::InvalidScope(value) => {
                write!(f, "search scope must be a package path: {value}")
            }
        }
    }
}

impl Error for ConfigError {}
