use serde::{Deserialize, Serialize};

/// Caller-supplied order identifier, unique for the lifetime of the process
pub type OrderId = u32;

/// Limit price in integer ticks
pub type Price = u32;

/// Order quantity in integer lots
pub type Quantity = u32;

/// Microsecond timestamp
///
/// Arrival times are assigned once at ingestion and act as the time-priority
/// tie-break, so only ordering and equality matter inside the engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from microseconds
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Microseconds held by this timestamp
    pub const fn as_micros(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(micros: i64) -> Self {
        Self(micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_ordering() {
        let early = Timestamp::from_micros(10);
        let late = Timestamp::from(11);

        assert!(early < late);
        assert_eq!(late.as_micros(), 11);
        assert_eq!(early.to_string(), "10");
    }
}
