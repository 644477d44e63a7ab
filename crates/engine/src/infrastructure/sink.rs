use std::io::{self, Write};

use agora_core::OrderEvent;
use agora_ports::EventSink;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Forwards events into an unbounded channel
///
/// Books never wait on consumers; a dropped receiver just discards events.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OrderEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that observes it
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<OrderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, event: OrderEvent) {
        if self.tx.send(event).is_err() {
            warn!("Event receiver dropped, discarding event");
        }
    }
}

/// Line format for [`WriterSink`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `Display` line per event
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes each event as one line to any `Write`
///
/// Publishing only queues the event. A blocking thread owns the writer, so
/// a slow output never stalls a book worker, and lines from different books
/// never tear.
#[derive(Debug, Clone)]
pub struct WriterSink {
    tx: mpsc::UnboundedSender<OrderEvent>,
}

impl WriterSink {
    /// Start the writer thread
    ///
    /// The handle resolves to the writer once every clone of the sink is
    /// dropped and the queued events are written.
    pub fn spawn<W>(writer: W, format: OutputFormat) -> (Self, JoinHandle<W>)
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::task::spawn_blocking(move || write_events(writer, format, rx));
        (Self { tx }, handle)
    }
}

impl EventSink for WriterSink {
    fn publish(&self, event: OrderEvent) {
        if self.tx.send(event).is_err() {
            warn!("Event writer stopped, discarding event");
        }
    }
}

fn write_events<W: Write>(
    mut writer: W,
    format: OutputFormat,
    mut rx: mpsc::UnboundedReceiver<OrderEvent>,
) -> W {
    let mut written = 0u64;
    while let Some(event) = rx.blocking_recv() {
        match write_event(&mut writer, format, &event) {
            Ok(()) => written += 1,
            Err(e) => warn!("Failed to write event for {}: {}", event.instrument(), e),
        }
    }
    debug!("Event writer finished after {} events", written);
    writer
}

fn write_event<W: Write>(writer: &mut W, format: OutputFormat, event: &OrderEvent) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(writer, "{}", event)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, event)?;
            writeln!(writer)?;
        }
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{Order, OrderAdded, OrderRequest, Timestamp};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn added() -> OrderEvent {
        let order = Order::new(
            OrderRequest::buy(1, "X", 100, 5),
            Timestamp::from_micros(10),
        );
        OrderEvent::Added(OrderAdded {
            order: order.request.clone(),
            arrival: order.arrival,
            processed: Timestamp::from_micros(11),
        })
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (sink, mut rx) = ChannelSink::pair();
        sink.publish(added());
        assert_eq!(rx.try_recv().unwrap(), added());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::pair();
        drop(rx);
        sink.publish(added());
    }

    #[tokio::test]
    async fn test_writer_sink_text_lines() {
        let (sink, writer) = WriterSink::spawn(Vec::new(), OutputFormat::Text);
        sink.publish(added());
        sink.publish(added());
        drop(sink);

        let output = String::from_utf8(writer.await.unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec!["B 1 X 100 5 10 11", "B 1 X 100 5 10 11"]);
    }

    #[tokio::test]
    async fn test_writer_sink_json_lines() {
        let (sink, writer) = WriterSink::spawn(Vec::new(), OutputFormat::Json);
        sink.publish(added());
        drop(sink);

        let output = String::from_utf8(writer.await.unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(value["type"], "added");
        assert_eq!(value["order"]["order_id"], 1);
        assert_eq!(value["processed"], 11);
    }

    /// Output whose writes wait while the gate is held
    struct GatedWriter {
        gate: Arc<Mutex<()>>,
        inner: Vec<u8>,
    }

    impl Write for GatedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let _open = self.gate.lock().unwrap_or_else(|p| p.into_inner());
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_output_does_not_block_publishers() {
        let _ = env_logger::try_init();
        let gate = Arc::new(Mutex::new(()));
        let output = GatedWriter {
            gate: gate.clone(),
            inner: Vec::new(),
        };
        let (sink, writer) = WriterSink::spawn(output, OutputFormat::Text);

        let closed = gate.lock().unwrap();
        let (done_tx, done_rx) = std::sync::mpsc::channel();
        let publisher = sink.clone();
        std::thread::spawn(move || {
            for _ in 0..3 {
                publisher.publish(added());
            }
            let _ = done_tx.send(());
        });
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("publishing returns while the output is stalled");

        drop(closed);
        drop(sink);
        let output = writer.await.unwrap();
        assert_eq!(String::from_utf8(output.inner).unwrap().lines().count(), 3);
    }
}
