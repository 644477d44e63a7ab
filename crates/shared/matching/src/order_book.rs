//! Per-instrument matching
//!
//! An incoming buy sweeps the sell container while the best ask is at or
//! below its limit; an incoming sell mirrors that against the buy container.
//! Every fill trades at the resting order's price. Whatever remains rests on
//! the incoming order's own side.

use std::collections::HashMap;
use std::sync::Arc;

use agora_core::{
    Instrument, Order, OrderAdded, OrderDeleted, OrderEvent, OrderExecuted, OrderId, Side,
};
use agora_ports::{BookResult, Clock};
use log::{debug, warn};

use crate::priority::SidePriority;
use crate::priority_book::{BuyBook, PriorityBook, SellBook};
use crate::snapshot::{BookSnapshot, RestingOrder};

/// Container an order id was placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestingSide {
    Buy,
    Sell,
}

/// Matching engine state for a single instrument
///
/// Not thread-safe by itself: exactly one worker owns each book and applies
/// orders to it in arrival order.
pub struct OrderBook {
    instrument: Instrument,
    buys: BuyBook,
    sells: SellBook,
    /// Side each order id was last placed on, so bare cancels can be routed
    sides: HashMap<OrderId, RestingSide>,
    clock: Arc<dyn Clock>,
}

impl OrderBook {
    pub fn new(instrument: Instrument, clock: Arc<dyn Clock>) -> Self {
        Self {
            instrument,
            buys: BuyBook::new(),
            sells: SellBook::new(),
            sides: HashMap::new(),
            clock,
        }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Number of resting orders on both sides
    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Look up a resting order on either side
    pub fn resting(&self, order_id: OrderId) -> Option<&Order> {
        self.buys.get(order_id).or_else(|| self.sells.get(order_id))
    }

    /// Process one order and return the events it produced, in order
    ///
    /// An error means the book found itself inconsistent; the caller should
    /// drop the events of this order and carry on with the next one.
    pub fn apply(&mut self, order: Order) -> BookResult<Vec<OrderEvent>> {
        match order.side() {
            Side::Buy => {
                self.record_side(order.id(), RestingSide::Buy);
                match_and_rest(order, &mut self.sells, &mut self.buys, self.clock.as_ref())
            }
            Side::Sell => {
                self.record_side(order.id(), RestingSide::Sell);
                match_and_rest(order, &mut self.buys, &mut self.sells, self.clock.as_ref())
            }
            Side::Cancel => self.cancel(order),
        }
    }

    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            instrument: self.instrument.clone(),
            bids: self
                .buys
                .orders_by_priority()
                .into_iter()
                .map(RestingOrder::from)
                .collect(),
            asks: self
                .sells
                .orders_by_priority()
                .into_iter()
                .map(RestingOrder::from)
                .collect(),
        }
    }

    fn record_side(&mut self, order_id: OrderId, side: RestingSide) {
        if self.sides.insert(order_id, side).is_some() {
            warn!(
                "Order id {} reused on {}; matching for this id is undefined",
                order_id, self.instrument
            );
        }
    }

    fn cancel(&mut self, mut order: Order) -> BookResult<Vec<OrderEvent>> {
        let order_id = order.id();
        let accepted = match self.sides.get(&order_id).copied() {
            None => {
                debug!(
                    "Cancel for unknown order {} on {}",
                    order_id, self.instrument
                );
                false
            }
            Some(RestingSide::Buy) => self.buys.delete_by_id(order_id),
            Some(RestingSide::Sell) => self.sells.delete_by_id(order_id),
        };

        if order.request.instrument.is_empty() {
            order.request.instrument = self.instrument.clone();
        }

        Ok(vec![OrderEvent::Deleted(OrderDeleted {
            order: order.request,
            accepted,
            arrival: order.arrival,
            processed: self.clock.now(),
        })])
    }
}

/// Sweep `opposite` with `order`, then rest any remainder in `own`
fn match_and_rest<R: SidePriority, O: SidePriority>(
    mut order: Order,
    opposite: &mut PriorityBook<R>,
    own: &mut PriorityBook<O>,
    clock: &dyn Clock,
) -> BookResult<Vec<OrderEvent>> {
    let mut events = Vec::new();
    let mut execution_seq = 0;

    while !order.is_filled() && !opposite.is_empty() {
        let best_price = opposite.peek_best()?.price();
        if !R::crosses(best_price, order.price()) {
            break;
        }

        let fill = opposite.fill_best(order.remaining())?;
        order.fill(fill.quantity);
        execution_seq += 1;

        events.push(OrderEvent::Executed(OrderExecuted {
            resting_order_id: fill.order_id,
            incoming_order_id: order.id(),
            instrument: order.instrument().clone(),
            execution_seq,
            price: fill.price,
            quantity: fill.quantity,
            arrival: order.arrival,
            processed: clock.now(),
        }));
    }

    if !order.is_filled() {
        let added = OrderAdded {
            order: order.request.clone(),
            arrival: order.arrival,
            processed: clock.now(),
        };
        own.push(order);
        events.push(OrderEvent::Added(added));
    }

    Ok(events)
}
