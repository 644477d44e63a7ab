//! Agora Runner
//!
//! Everything behind the `agora` binary:
//!
//! - **Config**: JSON configuration with environment overrides
//! - **Server**: Unix or TCP listener feeding binary records to the engine
//! - **Replay**: text command files pushed straight through the engine
//! - **Client**: text commands translated to binary records for a server
//!
//! Events are written to stdout, one line each; logs go to stderr.

pub mod client;
pub mod config;
pub mod error;
pub mod replay;
pub mod server;

pub use client::{send_commands, send_to};
pub use config::{LISTEN_ENV, ListenAddr, RunnerConfig};
pub use error::{Result, RunnerError};
pub use replay::replay;
pub use server::Server;
