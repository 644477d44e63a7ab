use serde::{Deserialize, Serialize};

/// Kind of an inbound request
///
/// `Buy` and `Sell` are limit orders; `Cancel` withdraws a resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
    Cancel,
}

impl Side {
    /// Single-byte tag used by the wire and text formats
    pub fn as_char(&self) -> char {
        match self {
            Side::Buy => 'B',
            Side::Sell => 'S',
            Side::Cancel => 'C',
        }
    }

    /// Parse the single-byte tag used by the wire and text formats
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'B' => Some(Side::Buy),
            b'S' => Some(Side::Sell),
            b'C' => Some(Side::Cancel),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
