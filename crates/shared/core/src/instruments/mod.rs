mod instrument;

pub use instrument::{INSTRUMENT_MAX_LEN, Instrument};
