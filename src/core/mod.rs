//! Core module
//!
//! Everything here works on characters and records, never on bytes or I/O:
//! - `tokenizer` - CSV state machine fed one character at a time
//! - `traits` - Record source abstractions the reader is written against
//! - `header` - Header name index with per-lookup caches
//! - `reader` - Field-indexing record reader
//! - `data_reader` - Table-row view over a record reader
//! - `formatter` - Field quoting and record buffering for the writers

pub mod data_reader;
pub mod formatter;
pub mod header;
pub mod reader;
pub mod tokenizer;
pub mod traits;

pub use data_reader::DataReader;
pub use formatter::RecordFormatter;
pub use header::HeaderIndex;
pub use reader::RecordReader;
pub use tokenizer::Tokenizer;
pub use traits::{RecordSource, RecordView};
