use std::cmp::Reverse;

use agora_core::{Order, Price, Side, Timestamp};

/// Ordering of one side of the book
///
/// A greater value is a better (earlier-matched) order. Ties on price fall
/// back to arrival time, then to the order in which the container received
/// the orders, which inside one book is the global arrival order.
pub trait SidePriority: Ord + Copy + std::fmt::Debug {
    /// Side whose resting orders this priority ranks
    const SIDE: Side;

    /// Rank an order; `seq` is the container's insertion counter
    fn rank(order: &Order, seq: u64) -> Self;

    /// True if an incoming order at `incoming` trades with a resting order
    /// on this side at `resting`
    fn crosses(resting: Price, incoming: Price) -> bool;
}

/// Buy side: higher price first, then earlier arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BidPriority {
    price: Price,
    arrival: Reverse<Timestamp>,
    seq: Reverse<u64>,
}

impl SidePriority for BidPriority {
    const SIDE: Side = Side::Buy;

    fn rank(order: &Order, seq: u64) -> Self {
        Self {
            price: order.price(),
            arrival: Reverse(order.arrival),
            seq: Reverse(seq),
        }
    }

    fn crosses(resting: Price, incoming: Price) -> bool {
        resting >= incoming
    }
}

/// Sell side: lower price first, then earlier arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AskPriority {
    price: Reverse<Price>,
    arrival: Reverse<Timestamp>,
    seq: Reverse<u64>,
}

impl SidePriority for AskPriority {
    const SIDE: Side = Side::Sell;

    fn rank(order: &Order, seq: u64) -> Self {
        Self {
            price: Reverse(order.price()),
            arrival: Reverse(order.arrival),
            seq: Reverse(seq),
        }
    }

    fn crosses(resting: Price, incoming: Price) -> bool {
        resting <= incoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::OrderRequest;

    fn order(price: Price, arrival: i64) -> Order {
        Order::new(
            OrderRequest::buy(1, "X", price, 1),
            Timestamp::from_micros(arrival),
        )
    }

    #[test]
    fn test_bid_prefers_higher_price_then_earlier_arrival() {
        assert!(BidPriority::rank(&order(101, 9), 1) > BidPriority::rank(&order(100, 1), 0));
        assert!(BidPriority::rank(&order(100, 1), 1) > BidPriority::rank(&order(100, 2), 0));
        assert!(BidPriority::rank(&order(100, 1), 0) > BidPriority::rank(&order(100, 1), 1));
    }

    #[test]
    fn test_ask_prefers_lower_price_then_earlier_arrival() {
        assert!(AskPriority::rank(&order(99, 9), 1) > AskPriority::rank(&order(100, 1), 0));
        assert!(AskPriority::rank(&order(100, 1), 1) > AskPriority::rank(&order(100, 2), 0));
        assert!(AskPriority::rank(&order(100, 1), 0) > AskPriority::rank(&order(100, 1), 1));
    }

    #[test]
    fn test_crossing() {
        // Resting bids trade with sells at or below them
        assert!(BidPriority::crosses(100, 100));
        assert!(BidPriority::crosses(100, 99));
        assert!(!BidPriority::crosses(100, 101));

        // Resting asks trade with buys at or above them
        assert!(AskPriority::crosses(100, 100));
        assert!(AskPriority::crosses(100, 101));
        assert!(!AskPriority::crosses(101, 100));
    }
}
