use agora_core::Timestamp;
use agora_ports::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Manually driven clock
///
/// Reads return the current value and then move it forward by `step`
/// (zero for a frozen clock). `advance` and `set` move it explicitly.
pub struct ManualClock {
    current: AtomicI64,
    step: i64,
}

impl ManualClock {
    /// Frozen clock that only moves through `advance`/`set`
    pub fn new(start_micros: i64) -> Self {
        Self::stepping(start_micros, 0)
    }

    /// Clock that advances by `step` microseconds after every read
    pub fn stepping(start_micros: i64, step: i64) -> Self {
        Self {
            current: AtomicI64::new(start_micros),
            step,
        }
    }

    /// Move the clock forward by `micros`
    pub fn advance(&self, micros: i64) {
        self.current.fetch_add(micros, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, micros: i64) {
        self.current.store(micros, Ordering::SeqCst);
    }

    /// Current value without stepping
    pub fn peek(&self) -> Timestamp {
        Timestamp::from_micros(self.current.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.current.fetch_add(self.step, Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_until_advanced() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), Timestamp::from(100));
        assert_eq!(clock.now(), Timestamp::from(100));

        clock.advance(5);
        assert_eq!(clock.now(), Timestamp::from(105));

        clock.set(7);
        assert_eq!(clock.peek(), Timestamp::from(7));
    }

    #[test]
    fn test_stepping() {
        let clock = ManualClock::stepping(0, 10);
        assert_eq!(clock.now(), Timestamp::from(0));
        assert_eq!(clock.now(), Timestamp::from(10));
        assert_eq!(clock.peek(), Timestamp::from(20));
    }
}
