use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bound of the router and book queues when nothing else is configured
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Queue sizing for the engine's workers
///
/// Both queues are bounded; once full, senders wait, which is how pressure
/// from a slow book propagates back to the connections feeding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the router's inbound queue
    pub router_capacity: usize,
    /// Capacity of each book worker's inbound queue
    pub book_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            router_capacity: DEFAULT_QUEUE_CAPACITY,
            book_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn with_router_capacity(mut self, capacity: usize) -> Self {
        self.router_capacity = capacity;
        self
    }

    pub fn with_book_capacity(mut self, capacity: usize) -> Self {
        self.book_capacity = capacity;
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.router_capacity == 0 {
            return Err(ConfigError::Invalid(
                "router_capacity must be at least 1".to_string(),
            ));
        }
        if self.book_capacity == 0 {
            return Err(ConfigError::Invalid(
                "book_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, error: String },
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(f, "Failed to read config file '{}': {}", path, error)
            }
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
