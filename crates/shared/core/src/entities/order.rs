use serde::{Deserialize, Serialize};

use super::Side;
use crate::instruments::Instrument;
use crate::values::{OrderId, Price, Quantity, Timestamp};

/// Decoded inbound request
///
/// Also serves as the order detail echoed in `Added` and `Deleted` events.
/// `price` and `quantity` carry no meaning for cancels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub side: Side,
    pub order_id: OrderId,
    pub instrument: Instrument,
    pub price: Price,
    pub quantity: Quantity,
}

impl OrderRequest {
    /// Limit buy request
    pub fn buy(
        order_id: OrderId,
        instrument: impl Into<Instrument>,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            side: Side::Buy,
            order_id,
            instrument: instrument.into(),
            price,
            quantity,
        }
    }

    /// Limit sell request
    pub fn sell(
        order_id: OrderId,
        instrument: impl Into<Instrument>,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            side: Side::Sell,
            order_id,
            instrument: instrument.into(),
            price,
            quantity,
        }
    }

    /// Bare cancel; the instrument is resolved by the router
    pub fn cancel(order_id: OrderId) -> Self {
        Self {
            side: Side::Cancel,
            order_id,
            instrument: Instrument::default(),
            price: 0,
            quantity: 0,
        }
    }
}

/// A request stamped at ingestion, plus its match bookkeeping
///
/// The arrival time is assigned once and never changes; `quantity` is the
/// remaining quantity and only ever decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub request: OrderRequest,
    pub arrival: Timestamp,
    /// Set on the first fill; an executed order can no longer be cancelled
    pub executed: bool,
}

impl Order {
    /// Stamp a request with its arrival time
    pub fn new(request: OrderRequest, arrival: Timestamp) -> Self {
        Self {
            request,
            arrival,
            executed: false,
        }
    }

    pub fn id(&self) -> OrderId {
        self.request.order_id
    }

    pub fn side(&self) -> Side {
        self.request.side
    }

    pub fn price(&self) -> Price {
        self.request.price
    }

    pub fn instrument(&self) -> &Instrument {
        &self.request.instrument
    }

    /// Returns remaining quantity to be filled
    pub fn remaining(&self) -> Quantity {
        self.request.quantity
    }

    /// Returns true once nothing is left to fill
    pub fn is_filled(&self) -> bool {
        self.request.quantity == 0
    }

    /// Consume `quantity` from the remainder and mark the order executed
    ///
    /// Never fills more than what remains; returns the quantity actually filled.
    pub fn fill(&mut self, quantity: Quantity) -> Quantity {
        let filled = quantity.min(self.request.quantity);
        self.request.quantity -= filled;
        self.executed = true;
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_decrements_and_marks_executed() {
        let mut order = Order::new(OrderRequest::buy(1, "X", 100, 10), Timestamp::from(5));
        assert!(!order.executed);

        assert_eq!(order.fill(4), 4);
        assert_eq!(order.remaining(), 6);
        assert!(order.executed);
        assert!(!order.is_filled());

        // Overfill is clamped to the remainder
        assert_eq!(order.fill(50), 6);
        assert_eq!(order.remaining(), 0);
        assert!(order.is_filled());
    }

    #[test]
    fn test_cancel_request_has_no_instrument() {
        let request = OrderRequest::cancel(7);
        assert_eq!(request.side, Side::Cancel);
        assert!(request.instrument.is_empty());
    }
}
