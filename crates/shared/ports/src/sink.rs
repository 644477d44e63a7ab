use agora_core::OrderEvent;

/// Port for delivering outbound events
///
/// Books publish from their own worker, so implementations must be callable
/// from many threads at once. Publishing never fails the caller: a sink that
/// cannot deliver logs and drops the event.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: OrderEvent);
}
