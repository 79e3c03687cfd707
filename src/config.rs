//! Routing configuration
//!
//! Every section is optional; a missing file section falls back to the same
//! defaults the library uses when built programmatically.

use crate::agent::{AgentRegistry, DEFAULT_HEARTBEAT_TIMEOUT};
use crate::error::RouterError;
use crate::routing::{RoutingLayer, RoutingOptions, RoutingScorer, ScoringWeights};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Main router configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouterConfig {
    #[serde(default)]
    pub registry: RegistrySection,
    /// Weights for the four component scores
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub routing: RoutingOptions,
}

/// Registry section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrySection {
    /// Seconds without a heartbeat before an agent is forced offline (default: 30)
    #[serde(default = "default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,
}

fn default_heartbeat_timeout_secs() -> u64 {
    DEFAULT_HEARTBEAT_TIMEOUT.as_secs()
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            heartbeat_timeout_secs: default_heartbeat_timeout_secs(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RouterConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the timeout and weight constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.heartbeat_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "registry.heartbeat_timeout_secs must be greater than zero".to_string(),
            ));
        }

        self.scoring
            .validate()
            .map_err(|e| ConfigError::InvalidConfig(format!("scoring: {e}")))
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.registry.heartbeat_timeout_secs)
    }

    /// Build a routing layer over a fresh, empty registry
    pub fn build_layer(&self) -> Result<RoutingLayer, RouterError> {
        self.validate()?;
        let registry = Arc::new(AgentRegistry::new(self.heartbeat_timeout()));
        let scorer = RoutingScorer::new(self.scoring)?;
        Ok(RoutingLayer::new(registry, scorer).with_options(self.routing))
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[registry]
heartbeat_timeout_secs = 5

[scoring]
capability = 0.4
load = 0.2
proximity = 0.2
stickiness = 0.2
"#;
        toml::from_str(toml_content).expect("Test config should parse")
    }
}
