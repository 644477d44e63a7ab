use std::sync::Arc;

use agora_clock::SystemClock;
use agora_core::{Instrument, OrderRequest};
use agora_matching::BookSnapshot;
use agora_ports::{Clock, EventSink};
use log::info;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::infrastructure::connection::{ConnectionReader, submit_to};
use crate::infrastructure::{Router, RouterCommand};

/// Entry point of the matching engine
///
/// Owns the router task. Requests from `submit` and from accepted
/// connections are stamped with their arrival time and queued for the
/// router, which hands them to per-instrument book workers.
pub struct Engine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    router_tx: mpsc::Sender<RouterCommand>,
    router_task: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl Engine {
    /// Start the router; books are created as instruments appear
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.validate()?;

        let (router_tx, router_rx) = mpsc::channel(config.router_capacity);
        let router = Router::new(config.book_capacity, clock.clone(), sink);
        let router_task = tokio::spawn(router.run(router_rx));
        let (shutdown_tx, _) = watch::channel(false);

        info!(
            "Engine started: router_capacity={}, book_capacity={}, clock={}",
            config.router_capacity,
            config.book_capacity,
            clock.name()
        );

        Ok(Self {
            config,
            clock,
            router_tx,
            router_task,
            shutdown_tx,
        })
    }

    /// Engine on the system clock with default queue sizes
    pub fn with_defaults(sink: Arc<dyn EventSink>) -> Result<Self> {
        Self::new(EngineConfig::default(), Arc::new(SystemClock::new()), sink)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stamp and queue one request
    ///
    /// Waits while the router's queue is full. Calls made sequentially
    /// from one task are processed in call order.
    pub async fn submit(&self, request: OrderRequest) -> Result<()> {
        submit_to(&self.router_tx, request, self.clock.as_ref()).await
    }

    /// Serve one client stream of binary records on its own task
    ///
    /// The task resolves to the number of requests read, or the error that
    /// closed the connection. Other connections are unaffected either way.
    pub fn accept<S>(&self, stream: S) -> JoinHandle<Result<u64>>
    where
        S: AsyncRead + Unpin + Send + 'static,
    {
        let reader = ConnectionReader::new(
            stream,
            self.router_tx.clone(),
            self.clock.clone(),
            self.shutdown_tx.subscribe(),
        );
        tokio::spawn(reader.run())
    }

    /// Copy of an instrument's book
    ///
    /// Reflects every request queued before this call from the same task.
    /// `None` if the instrument has no book yet.
    pub async fn snapshot(&self, instrument: impl Into<Instrument>) -> Result<Option<BookSnapshot>> {
        let (response, rx) = oneshot::channel();
        self.router_tx
            .send(RouterCommand::Snapshot {
                instrument: instrument.into(),
                response,
            })
            .await
            .map_err(|_| EngineError::RouterClosed)?;
        rx.await.map_err(|_| EngineError::RouterClosed)
    }

    /// Stop accepting input and wait until every queued request is processed
    ///
    /// Open connections stop reading; whatever they already queued is still
    /// matched and published before this returns.
    pub async fn shutdown(self) -> Result<()> {
        info!("Engine shutting down");
        self.shutdown_tx.send_replace(true);
        drop(self.router_tx);

        self.router_task
            .await
            .map_err(|e| EngineError::Internal(format!("router task failed: {}", e)))?;
        info!("Engine stopped");
        Ok(())
    }
}
