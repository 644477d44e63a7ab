//! Agora Engine
//!
//! Runs one worker task per instrument book behind a single router task.
//! Clients feed the engine either through [`Engine::submit`] or by handing
//! it a byte stream of binary records with [`Engine::accept`]; every
//! resulting event goes to the configured [`EventSink`].
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use agora_core::OrderRequest;
//! use agora_engine::{ChannelSink, Engine};
//!
//! # async fn demo() -> agora_engine::Result<()> {
//! let (sink, mut events) = ChannelSink::pair();
//! let engine = Engine::with_defaults(Arc::new(sink))?;
//!
//! engine.submit(OrderRequest::sell(1, "AAPL", 100, 10)).await?;
//! engine.submit(OrderRequest::buy(2, "AAPL", 101, 4)).await?;
//! engine.shutdown().await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{}", event);
//! }
//! # Ok(())
//! # }
//! ```

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Cross-cutting concerns
pub mod config;
pub mod error;

pub use application::Engine;
pub use infrastructure::{codec, sink};
pub use config::{ConfigError, DEFAULT_QUEUE_CAPACITY, EngineConfig};
pub use error::{EngineError, Result};
pub use infrastructure::{
    BookStats, ChannelSink, CodecError, OutputFormat, RECORD_LEN, WriterSink, decode_record,
    encode_record, parse_command, read_request,
};

pub use agora_matching::BookSnapshot;
pub use agora_ports::EventSink;
