use std::sync::Arc;

use agora_core::{Instrument, Order, OrderEvent};
use agora_matching::{BookSnapshot, OrderBook};
use agora_ports::{Clock, EventSink};
use log::{debug, error, info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{EngineError, Result};

/// Commands accepted by a book worker
#[derive(Debug)]
pub enum BookCommand {
    /// Match, rest or cancel an order
    Process(Order),

    /// Copy the book after every command queued ahead of this one
    Snapshot(oneshot::Sender<Option<BookSnapshot>>),
}

/// Counters reported when a worker stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookStats {
    pub orders_processed: u64,
    pub executions: u64,
    pub events_published: u64,
    /// Orders whose events were discarded after a book error
    pub orders_dropped: u64,
}

/// Sending side of a book worker plus its task
#[derive(Debug)]
pub struct BookHandle {
    instrument: Instrument,
    sender: mpsc::Sender<BookCommand>,
    task: JoinHandle<BookStats>,
}

impl BookHandle {
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Queue a command, waiting while the worker's queue is full
    pub async fn send(&self, cmd: BookCommand) -> Result<()> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| EngineError::BookClosed(self.instrument.clone()))
    }

    /// Close the queue and wait for the worker to drain it
    pub async fn close(self) -> Result<BookStats> {
        let BookHandle {
            instrument,
            sender,
            task,
        } = self;
        drop(sender);
        task.await.map_err(|e| {
            EngineError::Internal(format!("book worker for {} failed: {}", instrument, e))
        })
    }
}

/// Owns one instrument's book and processes its commands in queue order
pub struct BookWorker {
    book: OrderBook,
    receiver: mpsc::Receiver<BookCommand>,
    sink: Arc<dyn EventSink>,
    stats: BookStats,
}

impl BookWorker {
    /// Create the book and start its worker task
    pub fn spawn(
        instrument: Instrument,
        capacity: usize,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> BookHandle {
        let (sender, receiver) = mpsc::channel(capacity);

        let worker = BookWorker {
            book: OrderBook::new(instrument.clone(), clock),
            receiver,
            sink,
            stats: BookStats::default(),
        };
        let task = tokio::spawn(worker.run());

        BookHandle {
            instrument,
            sender,
            task,
        }
    }

    /// Main loop; ends once every sender is gone and the queue is empty
    async fn run(mut self) -> BookStats {
        info!("Book worker started for {}", self.book.instrument());

        while let Some(cmd) = self.receiver.recv().await {
            self.process_command(cmd);
        }

        info!(
            "Book worker for {} stopped: orders={}, executions={}, events={}, dropped={}, resting={}",
            self.book.instrument(),
            self.stats.orders_processed,
            self.stats.executions,
            self.stats.events_published,
            self.stats.orders_dropped,
            self.book.len()
        );
        self.stats
    }

    fn process_command(&mut self, cmd: BookCommand) {
        match cmd {
            BookCommand::Process(order) => self.handle_order(order),
            BookCommand::Snapshot(response) => {
                let _ = response.send(Some(self.book.snapshot()));
            }
        }
    }

    fn handle_order(&mut self, order: Order) {
        let order_id = order.id();
        self.stats.orders_processed += 1;

        match self.book.apply(order) {
            Ok(events) => {
                debug!(
                    "Order {} on {} produced {} events",
                    order_id,
                    self.book.instrument(),
                    events.len()
                );
                for event in events {
                    if matches!(event, OrderEvent::Executed(_)) {
                        self.stats.executions += 1;
                    }
                    self.stats.events_published += 1;
                    self.sink.publish(event);
                }
            }
            Err(e) => {
                self.stats.orders_dropped += 1;
                error!(
                    "Dropping events of order {} on {}: {}",
                    order_id,
                    self.book.instrument(),
                    e
                );
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

    fn order(clock: &ManualClock, request: OrderRequest) -> Order {
        Order::new(request, clock.now())
    }

    #[tokio::test]
    async fn test_worker_processes_in_queue_order() {
        let clock = Arc::new(ManualClock::stepping(100, 1));
        let (sink, mut rx) = ChannelSink::pair();
        let handle = BookWorker::spawn(
            Instrument::from("X"),
            8,
            clock.clone(),
            Arc::new(sink),
        );

        handle
            .send(BookCommand::Process(order(&clock, OrderRequest::sell(1, "X", 100, 5))))
            .await
            .unwrap();
        handle
            .send(BookCommand::Process(order(&clock, OrderRequest::buy(2, "X", 100, 3))))
            .await
            .unwrap();

        let stats = handle.close().await.unwrap();
        assert_eq!(stats.orders_processed, 2);
        assert_eq!(stats.executions, 1);
        assert_eq!(stats.events_published, 2);

        assert!(matches!(rx.recv().await, Some(OrderEvent::Added(_))));
        match rx.recv().await {
            Some(OrderEvent::Executed(e)) => {
                assert_eq!((e.resting_order_id, e.incoming_order_id), (1, 2));
                assert_eq!(e.quantity, 3);
            }
            other => panic!("expected execution, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_snapshot_sees_earlier_commands() {
        let clock = Arc::new(ManualClock::stepping(0, 1));
        let (sink, _rx) = ChannelSink::pair();
        let handle = BookWorker::spawn(Instrument::from("X"), 4, clock.clone(), Arc::new(sink));

        handle
            .send(BookCommand::Process(order(&clock, OrderRequest::buy(1, "X", 99, 2))))
            .await
            .unwrap();
        let (tx, rx) = oneshot::channel();
        handle.send(BookCommand::Snapshot(tx)).await.unwrap();

        let snapshot = rx.await.unwrap().unwrap();
        assert_eq!(snapshot.best_bid().map(|o| o.order_id), Some(1));
        assert!(snapshot.asks.is_empty());

        handle.close().await.unwrap();
    }
}
