use serde::{Deserialize, Serialize};

/// Longest symbol the wire format can carry
pub const INSTRUMENT_MAX_LEN: usize = 8;

/// Symbol of an independently traded instrument
///
/// Used as the routing key for books. A cancel may arrive with an empty
/// instrument, which the router resolves from its directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    /// Create a new instrument symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no symbol was supplied (bare cancels)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the symbol fits the wire format: 1 to 8 printable ASCII bytes
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= INSTRUMENT_MAX_LEN
            && self.0.bytes().all(|b| b.is_ascii_graphic())
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Instrument {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Instrument {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_validity() {
        assert!(Instrument::from("AAPL").is_valid());
        assert!(Instrument::from("ABCDEFGH").is_valid());
        assert!(!Instrument::from("ABCDEFGHI").is_valid());
        assert!(!Instrument::from("A B").is_valid());
        assert!(!Instrument::default().is_valid());
        assert!(Instrument::default().is_empty());
    }
}
