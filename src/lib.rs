//! Rust CSV Engine Library
//! # Overview
//!
//! This library provides a streaming CSV tokenizer with a field-indexing reader and
//! a buffered writer, each usable from blocking and async code.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Record, CsvError, strategy arguments, field results)
//! - [`config`] - Immutable configuration, its builder and the JSON options file
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Components independent of any byte source:
//!   - [`core::tokenizer`] - Character-level state machine producing records
//!   - [`core::reader`] - Header capture, name/index lookups, column count checks
//!   - [`core::data_reader`] - Table-row view with ordinals and null values
//!   - [`core::formatter`] - Quoting, escaping and record buffering for writers
//! - [`io`] - Parsers and writers over `std::io` and `futures::io`, output sinks
//! - [`strategy`] - Complete file-to-output pipelines (sync and async)
//!
//! # Reading
//!
//! ```
//! use rust_csv_engine::config::CsvConfig;
//! use rust_csv_engine::core::RecordReader;
//! use rust_csv_engine::io::CsvParser;
//! use std::io::Cursor;
//!
//! let config = CsvConfig::builder(",").build().unwrap();
//! let parser = CsvParser::new(Cursor::new("id,name\n1,\"Smith, J\"\n"), config);
//! let mut reader = RecordReader::new(parser);
//!
//! reader.read().unwrap();
//! reader.read_header().unwrap();
//! reader.read().unwrap();
//! assert_eq!(reader.field_by_name("name").unwrap().as_str(), Some("Smith, J"));
//! ```
//!
//! # Writing
//!
//! ```
//! use rust_csv_engine::config::CsvConfig;
//! use rust_csv_engine::io::CsvWriter;
//!
//! let config = CsvConfig::builder(",").build().unwrap();
//! let mut writer = CsvWriter::new(Vec::new(), config);
//! writer.write_record(["1", "Smith, J"]).unwrap();
//! assert_eq!(writer.into_inner().unwrap(), b"1,\"Smith, J\"\r\n");
//! ```

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use config::{CsvConfig, CsvConfigBuilder, CsvOptions};
pub use core::{DataReader, RecordReader};
pub use io::{AsyncCsvParser, AsyncCsvWriter, CsvParser, CsvWriter};
pub use types::{CsvError, FieldValue, Record, Recovery};
