//! Agora Matching
//!
//! Price-time priority containers and the per-instrument matching algorithm.
//! Everything here is synchronous; concurrency lives in `agora-engine`.

mod order_book;
mod priority;
mod priority_book;
mod snapshot;

pub use order_book::OrderBook;
pub use priority::{AskPriority, BidPriority, SidePriority};
pub use priority_book::{BuyBook, Fill, PriorityBook, SellBook};
pub use snapshot::{BookSnapshot, RestingOrder};

// Re-export the error type from ports for convenience
pub use agora_ports::{BookError, BookResult};
