//! Outbound events emitted by the books
//!
//! Every event carries the arrival timestamp of the order that caused it and
//! the timestamp at which the book produced it. The `Display` form is the
//! line-oriented output format:
//!
//! ```text
//! B <id> <instrument> <price> <count> <arrival> <processed>     added buy
//! S <id> <instrument> <price> <count> <arrival> <processed>     added sell
//! E <resting> <incoming> <seq> <price> <count> <arrival> <processed>
//! X <id> A|R <arrival> <processed>                              deleted
//! ```

use serde::{Deserialize, Serialize};

use crate::entities::OrderRequest;
use crate::instruments::Instrument;
use crate::values::{OrderId, Price, Quantity, Timestamp};

/// A remainder was placed in a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAdded {
    /// Order detail with the remaining quantity
    pub order: OrderRequest,
    pub arrival: Timestamp,
    pub processed: Timestamp,
}

/// A resting order traded against an incoming order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExecuted {
    pub resting_order_id: OrderId,
    pub incoming_order_id: OrderId,
    pub instrument: Instrument,
    /// 1-based, counted per incoming order
    pub execution_seq: u32,
    /// Always the resting order's price
    pub price: Price,
    pub quantity: Quantity,
    pub arrival: Timestamp,
    pub processed: Timestamp,
}

/// Outcome of a cancel request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDeleted {
    pub order: OrderRequest,
    pub accepted: bool,
    pub arrival: Timestamp,
    pub processed: Timestamp,
}

/// Events produced by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderEvent {
    Added(OrderAdded),
    Executed(OrderExecuted),
    Deleted(OrderDeleted),
}

impl OrderEvent {
    /// Instrument whose book produced the event
    pub fn instrument(&self) -> &Instrument {
        match self {
            OrderEvent::Added(e) => &e.order.instrument,
            OrderEvent::Executed(e) => &e.instrument,
            OrderEvent::Deleted(e) => &e.order.instrument,
        }
    }

    /// True if the event mentions `order_id` in any role
    pub fn references(&self, order_id: OrderId) -> bool {
        match self {
            OrderEvent::Added(e) => e.order.order_id == order_id,
            OrderEvent::Executed(e) => {
                e.resting_order_id == order_id || e.incoming_order_id == order_id
            }
            OrderEvent::Deleted(e) => e.order.order_id == order_id,
        }
    }

    pub fn processed(&self) -> Timestamp {
        match self {
            OrderEvent::Added(e) => e.processed,
            OrderEvent::Executed(e) => e.processed,
            OrderEvent::Deleted(e) => e.processed,
        }
    }
}

impl std::fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEvent::Added(e) => write!(
                f,
                "{} {} {} {} {} {} {}",
                e.order.side,
                e.order.order_id,
                e.order.instrument,
                e.order.price,
                e.order.quantity,
                e.arrival,
                e.processed
            ),
            OrderEvent::Executed(e) => write!(
                f,
                "E {} {} {} {} {} {} {}",
                e.resting_order_id,
                e.incoming_order_id,
                e.execution_seq,
                e.price,
                e.quantity,
                e.arrival,
                e.processed
            ),
            OrderEvent::Deleted(e) => write!(
                f,
                "X {} {} {} {}",
                e.order.order_id,
                if e.accepted { 'A' } else { 'R' },
                e.arrival,
                e.processed
            ),
        }
    }
}
