use agora_engine::{CodecError, ConfigError, EngineError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Line {line}: {source}")]
    Replay { line: usize, source: CodecError },

    #[error("Unsupported listen address: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
