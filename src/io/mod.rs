//! I/O module
//!
//! Connects the core state machines to byte sources and sinks.
//!
//! # Components
//!
//! - `block` - Block buffer with UTF-8 decoding across block boundaries
//! - `parser` - Blocking parser over `std::io::Read`
//! - `async_parser` - Async parser over `futures::io::AsyncRead`
//! - `writer` - Blocking writer over `std::io::Write`
//! - `async_writer` - Async writer over `futures::io::AsyncWrite`
//! - `output` - Text, JSON-lines and CSV sinks used by the binary

pub mod async_parser;
pub mod async_writer;
pub mod block;
pub mod output;
pub mod parser;
pub mod writer;

pub use async_parser::AsyncCsvParser;
pub use async_writer::AsyncCsvWriter;
pub use output::{create_sink, unique_header_names, RecordSink};
pub use parser::CsvParser;
pub use writer::CsvWriter;
