pub mod book_worker;
pub mod codec;
pub mod connection;
pub mod router;
pub mod sink;

pub use book_worker::{BookCommand, BookHandle, BookStats, BookWorker};
pub use codec::{CodecError, RECORD_LEN, decode_record, encode_record, parse_command, read_request};
pub use connection::ConnectionReader;
pub use router::{Router, RouterCommand};
pub use sink::{ChannelSink, OutputFormat, WriterSink};
