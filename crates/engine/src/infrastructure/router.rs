use std::collections::HashMap;
use std::sync::Arc;

use agora_core::{Instrument, Order, OrderDeleted, OrderEvent, OrderId, Side};
use agora_matching::BookSnapshot;
use agora_ports::{Clock, EventSink};
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot};

use super::book_worker::{BookCommand, BookHandle, BookWorker};
use crate::error::Result;

/// Commands accepted by the router
#[derive(Debug)]
pub enum RouterCommand {
    /// Forward a stamped order to its instrument's book
    Route(Order),

    /// Snapshot one instrument's book, `None` if it was never created
    Snapshot {
        instrument: Instrument,
        response: oneshot::Sender<Option<BookSnapshot>>,
    },
}

/// Single consumer that dispatches orders to per-instrument books
///
/// Owns the instrument directory and the order id directory; nothing else
/// touches them, so no locking is needed. Books are created on first use.
pub struct Router {
    books: HashMap<Instrument, BookHandle>,
    directory: HashMap<OrderId, Instrument>,
    book_capacity: usize,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
}

impl Router {
    pub fn new(book_capacity: usize, clock: Arc<dyn Clock>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            books: HashMap::new(),
            directory: HashMap::new(),
            book_capacity,
            clock,
            sink,
        }
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Process commands until every sender is dropped, then drain the books
    pub async fn run(mut self, mut receiver: mpsc::Receiver<RouterCommand>) {
        info!("Router started with book capacity {}", self.book_capacity);

        while let Some(cmd) = receiver.recv().await {
            match cmd {
                RouterCommand::Route(order) => {
                    let order_id = order.id();
                    if let Err(e) = self.route(order).await {
                        error!("Failed to route order {}: {}", order_id, e);
                    }
                }
                RouterCommand::Snapshot {
                    instrument,
                    response,
                } => self.snapshot(instrument, response).await,
            }
        }

        info!("Router input closed, draining {} books", self.books.len());
        self.close_books().await;
        info!("Router stopped");
    }

    /// Resolve the order's book and queue it there
    ///
    /// Waits while the target book's queue is full, which in turn stops the
    /// router from draining its own queue.
    pub async fn route(&mut self, mut order: Order) -> Result<()> {
        match order.side() {
            Side::Buy | Side::Sell => {
                let instrument = order.instrument().clone();
                if let Some(previous) = self.directory.insert(order.id(), instrument) {
                    warn!(
                        "Order id {} reused (was on {}, now {})",
                        order.id(),
                        previous,
                        order.instrument()
                    );
                }
            }
            Side::Cancel => match self.directory.get(&order.id()) {
                Some(instrument) => order.request.instrument = instrument.clone(),
                // The book rejects ids it has never seen
                None if self.books.contains_key(order.instrument()) => {}
                None => {
                    self.reject_cancel(order);
                    return Ok(());
                }
            },
        }

        debug!(
            "Routing {} order {} to {}",
            order.side(),
            order.id(),
            order.instrument()
        );
        self.book_for(order.instrument())
            .send(BookCommand::Process(order))
            .await
    }

    fn book_for(&mut self, instrument: &Instrument) -> &BookHandle {
        let capacity = self.book_capacity;
        let clock = &self.clock;
        let sink = &self.sink;
        self.books.entry(instrument.clone()).or_insert_with(|| {
            info!("Creating book for {}", instrument);
            BookWorker::spawn(instrument.clone(), capacity, clock.clone(), sink.clone())
        })
    }

    /// Cancel for an id no book has seen: answer without creating a book
    fn reject_cancel(&self, order: Order) {
        debug!("Rejecting cancel for unknown order {}", order.id());
        self.sink.publish(OrderEvent::Deleted(OrderDeleted {
            order: order.request,
            accepted: false,
            arrival: order.arrival,
            processed: self.clock.now(),
        }));
    }

    async fn snapshot(
        &self,
        instrument: Instrument,
        response: oneshot::Sender<Option<BookSnapshot>>,
    ) {
        match self.books.get(&instrument) {
            // The book answers directly once it reaches the request
            Some(book) => {
                if let Err(e) = book.send(BookCommand::Snapshot(response)).await {
                    error!("Snapshot of {} failed: {}", instrument, e);
                }
            }
            None => {
                let _ = response.send(None);
            }
        }
    }

    async fn close_books(&mut self) {
        let books: Vec<BookHandle> = self.books.drain().map(|(_, book)| book).collect();
        for book in books {
            let instrument = book.instrument().clone();
            match book.close().await {
                Ok(stats) => debug!("Book {} closed after {} orders", instrument, stats.orders_processed),
                Err(e) => error!("{}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sink::ChannelSink;
    use agora_clock::ManualClock;
    use agora_core::OrderRequest;

    fn router() -> (Router, Arc<ManualClock>, mpsc::UnboundedReceiver<OrderEvent>) {
        let clock = Arc::new(ManualClock::stepping(0, 1));
        let (sink, rx) = ChannelSink::pair();
        (Router::new(4, clock.clone(), Arc::new(sink)), clock, rx)
    }

    #[tokio::test]
    async fn test_books_created_lazily() {
        let (mut router, clock, _rx) = router();
        assert_eq!(router.book_count(), 0);

        let order = Order::new(OrderRequest::buy(1, "A", 10, 1), clock.now());
        router.route(order).await.unwrap();
        let order = Order::new(OrderRequest::buy(2, "A", 10, 1), clock.now());
        router.route(order).await.unwrap();
        assert_eq!(router.book_count(), 1);

        let order = Order::new(OrderRequest::sell(3, "B", 10, 1), clock.now());
        router.route(order).await.unwrap();
        assert_eq!(router.book_count(), 2);

        router.close_books().await;
    }

    #[tokio::test]
    async fn test_unknown_cancel_answered_without_book() {
        let (mut router, clock, mut rx) = router();

        let cancel = Order::new(OrderRequest::cancel(77), clock.now());
        router.route(cancel).await.unwrap();
        assert_eq!(router.book_count(), 0);

        match rx.recv().await {
            Some(OrderEvent::Deleted(deleted)) => {
                assert_eq!(deleted.order.order_id, 77);
                assert!(!deleted.accepted);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_resolves_instrument_from_directory() {
        let (mut router, clock, mut rx) = router();

        let order = Order::new(OrderRequest::sell(5, "AAPL", 100, 2), clock.now());
        router.route(order).await.unwrap();
        let cancel = Order::new(OrderRequest::cancel(5), clock.now());
        router.route(cancel).await.unwrap();
        router.close_books().await;

        assert!(matches!(rx.recv().await, Some(OrderEvent::Added(_))));
        match rx.recv().await {
            Some(OrderEvent::Deleted(deleted)) => {
                assert!(deleted.accepted);
                assert_eq!(deleted.order.instrument.as_str(), "AAPL");
            }
            other => panic!("expected deletion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_snapshot_of_missing_book() {
        let (router, _clock, _rx) = router();
        let (tx, rx) = oneshot::channel();
        router.snapshot(Instrument::from("NONE"), tx).await;
        assert_eq!(rx.await.unwrap(), None);
    }
}
