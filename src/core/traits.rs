//! Core traits for record sources
//!
//! The record reader is written against these traits so the same header and
//! field-lookup logic serves the blocking parser, the async parser and test doubles.

use crate::config::CsvConfig;
use crate::types::{CsvError, Record};

/// Read access to the record a source is currently positioned on
pub trait RecordView {
    /// The current record; empty before the first advance
    fn record(&self) -> &Record;

    /// 1-based physical row of the current record, 0 before the first advance
    fn row(&self) -> u64;

    /// Configuration the source was built with
    fn config(&self) -> &CsvConfig;
}

/// A source that can be advanced without blocking on an async runtime
pub trait RecordSource: RecordView {
    /// Move to the next record
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - the next record
    /// * `Ok(None)` - the source is exhausted
    /// * `Err(CsvError)` - tokenizing failed and the strategy chose to fail
    fn advance(&mut self) -> Result<Option<&Record>, CsvError>;
}
