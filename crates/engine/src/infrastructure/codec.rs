//! Inbound request formats
//!
//! Binary clients send fixed 28-byte little-endian records:
//!
//! | offset | size | field                                 |
//! |--------|------|---------------------------------------|
//! | 0      | 4    | type tag as u32 (`'B'`, `'S'`, `'C'`) |
//! | 4      | 4    | order id                              |
//! | 8      | 4    | price                                 |
//! | 12     | 4    | count                                 |
//! | 16     | 9    | instrument, NUL terminated            |
//! | 25     | 3    | padding                               |
//!
//! Replay files and interactive clients use one command per line:
//! `B <id> <instrument> <price> <count>`, `S ...`, or `C <id> [instrument]`.

use agora_core::{INSTRUMENT_MAX_LEN, Instrument, OrderRequest, Side};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Size of one binary request record
pub const RECORD_LEN: usize = 28;

const INSTRUMENT_OFFSET: usize = 16;
const INSTRUMENT_FIELD_LEN: usize = INSTRUMENT_MAX_LEN + 1;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unknown order type tag {0:#x}")]
    UnknownSide(u32),

    #[error("Invalid instrument {0:?}")]
    InvalidInstrument(String),

    #[error("Stream ended {0} bytes into a record")]
    Truncated(usize),

    #[error("Malformed command {line:?}: {reason}")]
    Parse { line: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn u32_at(buf: &[u8; RECORD_LEN], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn check_instrument(side: Side, instrument: Instrument) -> Result<Instrument, CodecError> {
    // Cancels may leave the field empty
    if instrument.is_valid() || (side == Side::Cancel && instrument.is_empty()) {
        Ok(instrument)
    } else {
        Err(CodecError::InvalidInstrument(instrument.to_string()))
    }
}

/// Decode one binary record
pub fn decode_record(buf: &[u8; RECORD_LEN]) -> Result<OrderRequest, CodecError> {
    let tag = u32_at(buf, 0);
    let side = u8::try_from(tag)
        .ok()
        .and_then(Side::from_tag)
        .ok_or(CodecError::UnknownSide(tag))?;

    let field = &buf[INSTRUMENT_OFFSET..INSTRUMENT_OFFSET + INSTRUMENT_FIELD_LEN];
    let len = field
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| CodecError::InvalidInstrument(String::from_utf8_lossy(field).into_owned()))?;
    let symbol = std::str::from_utf8(&field[..len])
        .map_err(|_| CodecError::InvalidInstrument(String::from_utf8_lossy(&field[..len]).into_owned()))?;
    let instrument = check_instrument(side, Instrument::from(symbol))?;

    Ok(OrderRequest {
        side,
        order_id: u32_at(buf, 4),
        instrument,
        price: u32_at(buf, 8),
        quantity: u32_at(buf, 12),
    })
}

/// Encode a request as a binary record
pub fn encode_record(request: &OrderRequest) -> Result<[u8; RECORD_LEN], CodecError> {
    let instrument = check_instrument(request.side, request.instrument.clone())?;

    let mut buf = [0u8; RECORD_LEN];
    buf[0..4].copy_from_slice(&u32::from(request.side.as_char() as u8).to_le_bytes());
    buf[4..8].copy_from_slice(&request.order_id.to_le_bytes());
    buf[8..12].copy_from_slice(&request.price.to_le_bytes());
    buf[12..16].copy_from_slice(&request.quantity.to_le_bytes());
    let symbol = instrument.as_str().as_bytes();
    buf[INSTRUMENT_OFFSET..INSTRUMENT_OFFSET + symbol.len()].copy_from_slice(symbol);
    Ok(buf)
}

/// Read the next record from a stream
///
/// Returns `Ok(None)` when the peer closes cleanly between records. Closing
/// part way through a record is a `Truncated` error.
pub async fn read_request<R>(reader: &mut R) -> Result<Option<OrderRequest>, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; RECORD_LEN];
    let mut filled = 0;
    while filled < RECORD_LEN {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(CodecError::Truncated(filled))
            };
        }
        filled += n;
    }
    decode_record(&buf).map(Some)
}

/// Parse one line of the text command format
///
/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<OrderRequest>, CodecError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let parse_error = |reason: &str| CodecError::Parse {
        line: trimmed.to_string(),
        reason: reason.to_string(),
    };
    let number = |field: Option<&str>, name: &str| -> Result<u32, CodecError> {
        field
            .ok_or_else(|| parse_error(&format!("missing {}", name)))?
            .parse::<u32>()
            .map_err(|e| parse_error(&format!("bad {}: {}", name, e)))
    };

    let mut fields = trimmed.split_whitespace();
    let tag = fields.next().unwrap_or_default();
    let side = match tag {
        "B" => Side::Buy,
        "S" => Side::Sell,
        "C" => Side::Cancel,
        other => return Err(parse_error(&format!("unknown command {:?}", other))),
    };

    let order_id = number(fields.next(), "order id")?;
    let request = match side {
        Side::Cancel => {
            let mut request = OrderRequest::cancel(order_id);
            if let Some(symbol) = fields.next() {
                request.instrument = check_instrument(side, Instrument::from(symbol))?;
            }
            request
        }
        Side::Buy | Side::Sell => {
            let symbol = fields.next().ok_or_else(|| parse_error("missing instrument"))?;
            let instrument = check_instrument(side, Instrument::from(symbol))?;
            OrderRequest {
                side,
                order_id,
                instrument,
                price: number(fields.next(), "price")?,
                quantity: number(fields.next(), "count")?,
            }
        }
    };

    if fields.next().is_some() {
        return Err(parse_error("trailing fields"));
    }
    Ok(Some(request))
}
