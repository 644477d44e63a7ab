//! Agora Ports
//!
//! Port definitions (traits) for the Agora matching engine.
//! These define the boundaries between domain logic and infrastructure.

mod clock;
mod error;
mod sink;

pub use clock::Clock;
pub use error::{BookError, BookResult};
pub use sink::EventSink;
