//! One side of an instrument's book
//!
//! Orders live in an id-keyed index; the heap only holds ids and their rank.
//! All position bookkeeping stays inside `PriorityQueue`, so removing an
//! arbitrary order is a swap-with-last plus one sift, and the `Order` values
//! never carry heap positions around.

use std::collections::HashMap;

use agora_core::{Order, OrderId, Price, Quantity};
use agora_ports::{BookError, BookResult};
use priority_queue::PriorityQueue;

use crate::priority::{AskPriority, BidPriority, SidePriority};

/// Buy container: best bid at the head
pub type BuyBook = PriorityBook<BidPriority>;

/// Sell container: best ask at the head
pub type SellBook = PriorityBook<AskPriority>;

/// Result of filling against the head of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub order_id: OrderId,
    /// Resting order's limit price
    pub price: Price,
    pub quantity: Quantity,
    /// What the resting order has left; zero means it left the container
    pub remaining: Quantity,
}

/// Price-time priority container for one side
#[derive(Debug)]
pub struct PriorityBook<P: SidePriority> {
    queue: PriorityQueue<OrderId, P>,
    orders: HashMap<OrderId, Order>,
    next_seq: u64,
}

impl<P: SidePriority> PriorityBook<P> {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            orders: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Insert an order, O(log n)
    ///
    /// Orders with nothing left to fill are never held. Pushing an id that is
    /// already resting replaces the earlier order and returns it.
    pub fn push(&mut self, order: Order) -> Option<Order> {
        if order.is_filled() {
            return None;
        }

        let order_id = order.id();
        let rank = P::rank(&order, self.next_seq);
        self.next_seq += 1;

        self.queue.push(order_id, rank);
        self.orders.insert(order_id, order)
    }

    /// Best order without removing it
    pub fn peek_best(&self) -> BookResult<&Order> {
        let order_id = self.best_id()?;
        self.orders
            .get(&order_id)
            .ok_or(BookError::MissingOrder(order_id))
    }

    /// Remove and return the best order
    pub fn pop_best(&mut self) -> BookResult<Order> {
        let (order_id, _) = self.queue.pop().ok_or(BookError::Empty(P::SIDE))?;
        self.orders
            .remove(&order_id)
            .ok_or(BookError::MissingOrder(order_id))
    }

    /// Trade up to `quantity` against the best order
    ///
    /// Marks the resting order executed and removes it once fully filled.
    /// Only the remaining quantity changes, so the heap order is unaffected.
    pub fn fill_best(&mut self, quantity: Quantity) -> BookResult<Fill> {
        let order_id = self.best_id()?;
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(BookError::MissingOrder(order_id))?;

        let filled = order.fill(quantity);
        let fill = Fill {
            order_id,
            price: order.price(),
            quantity: filled,
            remaining: order.remaining(),
        };

        if fill.remaining == 0 {
            self.pop_best()?;
        }
        Ok(fill)
    }

    /// Remove a resting order that has never traded
    ///
    /// Returns false if the id is not resting here or the order has already
    /// been executed (executed orders stay in the book untouched).
    pub fn delete_by_id(&mut self, order_id: OrderId) -> bool {
        match self.orders.get(&order_id) {
            Some(order) if !order.executed => {}
            _ => return false,
        }

        self.queue.remove(&order_id);
        self.orders.remove(&order_id).is_some()
    }

    /// Resting orders from best to worst
    pub fn orders_by_priority(&self) -> Vec<&Order> {
        let mut ranked: Vec<(&P, &Order)> = self
            .queue
            .iter()
            .filter_map(|(order_id, rank)| self.orders.get(order_id).map(|order| (rank, order)))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(a.0));
        ranked.into_iter().map(|(_, order)| order).collect()
    }

    fn best_id(&self) -> BookResult<OrderId> {
        self.queue
            .peek()
            .map(|(order_id, _)| *order_id)
            .ok_or(BookError::Empty(P::SIDE))
    }
}

impl<P: SidePriority> Default for PriorityBook<P> {
    fn default() -> Self {
        Self::new()
    }
}
