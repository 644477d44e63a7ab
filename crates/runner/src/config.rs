use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use agora_engine::{ConfigError, EngineConfig, OutputFormat};
use log::info;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `listen`
pub const LISTEN_ENV: &str = "AGORA_LISTEN";

/// Socket the server listens on
///
/// Written as `unix:<path>` or `tcp:<host:port>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ListenAddr {
    Unix(PathBuf),
    Tcp(String),
}

impl Default for ListenAddr {
    fn default() -> Self {
        ListenAddr::Unix(PathBuf::from("/tmp/agora.sock"))
    }
}

impl FromStr for ListenAddr {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ConfigError::Invalid(format!(
                "listen address {:?} must be unix:<path> or tcp:<host:port>",
                s
            ))
        };
        match s.split_once(':') {
            Some(("unix", path)) if !path.is_empty() => Ok(ListenAddr::Unix(PathBuf::from(path))),
            Some(("tcp", addr)) if addr.contains(':') => Ok(ListenAddr::Tcp(addr.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ListenAddr {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ListenAddr> for String {
    fn from(addr: ListenAddr) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenAddr::Unix(path) => write!(f, "unix:{}", path.display()),
            ListenAddr::Tcp(addr) => write!(f, "tcp:{}", addr),
        }
    }
}

/// Top-level configuration of the `agora` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Name shown in logs
    pub name: String,
    pub listen: ListenAddr,
    /// Format of the event lines written to stdout
    pub output: OutputFormat,
    pub engine: EngineConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            name: "agora".to_string(),
            listen: ListenAddr::default(),
            output: OutputFormat::Text,
            engine: EngineConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.engine.validate()?;
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

    /// Apply `AGORA_LISTEN` if it is set
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        match std::env::var(LISTEN_ENV) {
            Ok(value) => self.override_listen(&value),
            Err(_) => Ok(()),
        }
    }

    fn override_listen(&mut self, value: &str) -> Result<(), ConfigError> {
        self.listen = value.parse()?;
        info!("Listen address overridden by {}: {}", LISTEN_ENV, self.listen);
        Ok(())
    }
}
