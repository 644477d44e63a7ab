//! Agora Core Domain
//!
//! Pure domain types for the Agora matching engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod events;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Order, OrderRequest, Side};
pub use events::{OrderAdded, OrderDeleted, OrderEvent, OrderExecuted};
pub use instruments::{INSTRUMENT_MAX_LEN, Instrument};
pub use values::{OrderId, Price, Quantity, Timestamp};
