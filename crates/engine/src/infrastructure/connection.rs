use std::sync::Arc;

use agora_core::{Order, OrderRequest};
use agora_ports::Clock;
use log::{debug, error, info};
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, watch};

use super::codec::read_request;
use super::router::RouterCommand;
use crate::error::{EngineError, Result};

/// Stamp a request with its arrival time and queue it for the router
///
/// Waits while the router's queue is full.
pub async fn submit_to(
    router: &mpsc::Sender<RouterCommand>,
    request: OrderRequest,
    clock: &dyn Clock,
) -> Result<()> {
    let order = Order::new(request, clock.now());
    router
        .send(RouterCommand::Route(order))
        .await
        .map_err(|_| EngineError::RouterClosed)
}

/// Reads binary records from one client and feeds them to the router
///
/// Ends on clean EOF or shutdown. A read or decode error closes only this
/// connection.
pub struct ConnectionReader<S> {
    stream: S,
    router: mpsc::Sender<RouterCommand>,
    clock: Arc<dyn Clock>,
    shutdown: watch::Receiver<bool>,
}

impl<S> ConnectionReader<S>
where
    S: AsyncRead + Unpin + Send + 'static,
{
    pub fn new(
        stream: S,
        router: mpsc::Sender<RouterCommand>,
        clock: Arc<dyn Clock>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            stream,
            router,
            clock,
            shutdown,
        }
    }

    /// Returns the number of requests forwarded
    pub async fn run(mut self) -> Result<u64> {
        let mut received = 0u64;
        if *self.shutdown.borrow() {
            return Ok(received);
        }

        loop {
            let next = tokio::select! {
                _ = self.shutdown.changed() => {
                    debug!("Connection closing on shutdown after {} requests", received);
                    break;
                }
                next = read_request(&mut self.stream) => next,
            };

            match next {
                Ok(Some(request)) => {
                    submit_to(&self.router, request, self.clock.as_ref()).await?;
                    received += 1;
                }
                Ok(None) => {
                    info!("Connection closed by peer after {} requests", received);
                    break;
                }
                Err(e) => {
                    error!("Dropping connection after {} requests: {}", received, e);
                    return Err(e.into());
                }
            }
        }

        Ok(received)
    }
}
