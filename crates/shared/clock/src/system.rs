use agora_core::Timestamp;
use agora_ports::Clock;
use chrono::Utc;
use std::time::Instant;

/// Real system clock for production use
///
/// Anchored to wall time once at construction, then advanced with a
/// monotonic `Instant`, so NTP adjustments can never reorder arrivals.
pub struct SystemClock {
    anchor_micros: i64,
    anchor: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            anchor_micros: Utc::now().timestamp_micros(),
            anchor: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let elapsed = i64::try_from(self.anchor.elapsed().as_micros()).unwrap_or(i64::MAX);
        Timestamp::from_micros(self.anchor_micros.saturating_add(elapsed))
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let time1 = clock.now();
        thread::sleep(std::time::Duration::from_millis(10));
        let time2 = clock.now();

        assert!(time2 > time1);
        assert!(time2.as_micros() - time1.as_micros() >= 9_000);
    }

    #[test]
    fn test_system_clock_never_runs_backwards() {
        let clock = SystemClock::new();
        let mut last = clock.now();
        for _ in 0..10_000 {
            let now = clock.now();
            assert!(now >= last);
            last = now;
        }
    }
}
