//! Types module
//!
//! Contains core data structures used throughout the crate.
//! This module organizes types into logical submodules:
//! - `record`: the tokenized record
//! - `outcome`: strategy arguments, recovery decisions and field lookup results
//! - `error`: Error types for the CSV engine

pub mod error;
pub mod outcome;
pub mod record;

pub use error::CsvError;
pub use outcome::{
    BadDataArgs, FieldValue, MissingFieldArgs, PrepareHeaderArgs, ReadingExceptionArgs, Recovery,
    ShouldSkipRecordArgs,
};
pub use record::{Record, RecordIter};
