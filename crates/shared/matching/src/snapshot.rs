use agora_core::{Instrument, Order, OrderId, Price, Quantity, Timestamp};
use serde::{Deserialize, Serialize};

/// A resting order as seen in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub arrival: Timestamp,
    pub executed: bool,
}

impl From<&Order> for RestingOrder {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id(),
            price: order.price(),
            quantity: order.remaining(),
            arrival: order.arrival,
            executed: order.executed,
        }
    }
}

/// Point-in-time copy of one instrument's book, best orders first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub instrument: Instrument,
    pub bids: Vec<RestingOrder>,
    pub asks: Vec<RestingOrder>,
}

impl BookSnapshot {
    pub fn best_bid(&self) -> Option<&RestingOrder> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&RestingOrder> {
        self.asks.first()
    }

    /// Find a resting order on either side
    pub fn find(&self, order_id: OrderId) -> Option<&RestingOrder> {
        self.bids
            .iter()
            .chain(self.asks.iter())
            .find(|o| o.order_id == order_id)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
