use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::error::{RelayError, ErrorCode};
use crate::topicrelay::topics::TopicIdStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub id: String,
    /// Topics created when the broker is initialised
    pub topics: Vec<String>,
    pub topic_ids: TopicIdStrategy,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            id: "broker".to_string(),
            topics: Vec::new(),
            topic_ids: TopicIdStrategy::default(),
        }
    }
}

impl BrokerConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, RelayError> {
        toml::from_str(content)
            .map_err(|e| RelayError::new(ErrorCode::ConfigInvalid, format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, RelayError> {
        let content = fs::read_to_string(path)
            .map_err(|e| RelayError::new(ErrorCode::ConfigInvalid, format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RelayError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RelayError::new(ErrorCode::ConfigInvalid, format!("Failed to serialize to TOML: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| RelayError::new(ErrorCode::ConfigInvalid, format!("Failed to write config file: {}", e)))
    }
}
