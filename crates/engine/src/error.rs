use agora_core::Instrument;
use thiserror::Error;

use crate::config::ConfigError;
use crate::infrastructure::codec::CodecError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Router has shut down")]
    RouterClosed,

    #[error("Book worker for {0} has shut down")]
    BookClosed(Instrument),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
