//! Engine configuration.

use memory_manager::HeapConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default limit on nested calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// Errors produced while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input was not valid JSON for an [`EngineConfig`]
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field had an unusable value
    #[error("invalid engine configuration: {field} {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Settings of one engine instance.
///
/// Missing fields take their defaults when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Collector settings
    pub heap: HeapConfig,
    /// Maximum number of nested function calls
    pub max_call_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            heap: HeapConfig::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// ```
    /// use engine::EngineConfig;
    ///
    /// let config = EngineConfig::from_json(r#"{"max_call_depth": 64}"#).unwrap();
    /// assert_eq!(config.max_call_depth, 64);
    /// assert_eq!(config.heap.gc_threshold, 4096);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_call_depth",
                reason: "must be positive",
            });
        }
        if self.heap.gc_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "heap.gc_threshold",
                reason: "must be positive",
            });
        }
        if self.heap.growth_factor.is_nan() || self.heap.growth_factor < 1.0 {
            return Err(ConfigError::Invalid {
                field: "heap.growth_factor",
                reason: "must be at least 1.0",
            });
        }
        Ok(())
    }
}
