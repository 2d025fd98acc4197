//! Error types for the CSV engine
//!
//! This module defines every error the tokenizer, reader and writer can report.
//! Errors carry enough positional context (row, field index, header names, raw
//! text) to pinpoint the offending input.
//!
//! # Error Categories
//!
//! - **Usage Errors**: API misuse such as reading fields before any record was read.
//!   Always fatal, never routed through a strategy.
//! - **Data Errors**: bad data, missing fields and column count changes. Each one is
//!   handed to exactly one configurable strategy before it is returned.
//! - **Decoding Errors**: input that is not valid UTF-8.
//! - **Configuration Errors**: invalid builder settings.
//! - **I/O Errors**: failures of the underlying source or sink.

use thiserror::Error;

/// Main error type for the CSV engine
///
/// Each variant includes the context needed to diagnose the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CsvError {
    /// The API was used in an order it does not support
    ///
    /// Examples: accessing fields before `read`, capturing a header when header
    /// records are disabled. This is never recoverable via a strategy.
    #[error("Usage error: {message}")]
    Usage {
        /// Description of the misuse
        message: String,
    },

    /// Malformed quoting or escaping found while tokenizing
    #[error("Bad data at row {row}, field {field_index}: {message}{}", raw_suffix(field.as_deref(), raw_record.as_deref()))]
    BadData {
        /// 1-based row being tokenized
        row: u64,
        /// 0-based index of the field being tokenized
        field_index: usize,
        /// Field text read so far (omitted when raw data is excluded from errors)
        field: Option<String>,
        /// Raw record text read so far (omitted when raw data is excluded from errors)
        raw_record: Option<String>,
        /// Description of the problem
        message: String,
    },

    /// A field requested by index or name is not present in the current record
    #[error("Missing field at row {row}: {message}")]
    MissingField {
        /// 1-based row of the current record
        row: u64,
        /// Requested index (a field index, or the occurrence index for name lookups)
        index: usize,
        /// Requested header names (empty for lookups by index)
        names: Vec<String>,
        /// Description of the missing field
        message: String,
    },

    /// A record's field count differs from the established baseline
    #[error("Inconsistent number of columns at row {row}: expected {expected}, found {actual}")]
    ColumnCountChange {
        /// 1-based row of the offending record
        row: u64,
        /// Column count of the previous records
        expected: usize,
        /// Column count of this record
        actual: usize,
    },

    /// The byte stream is not valid UTF-8
    #[error("Invalid UTF-8 in input near row {row}")]
    InvalidUtf8 {
        /// 1-based row being tokenized
        row: u64,
    },

    /// Builder settings that cannot produce a working configuration
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Description of the invalid setting
        message: String,
    },

    /// I/O error on the source or sink
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },
}

fn raw_suffix(field: Option<&str>, raw_record: Option<&str>) -> String {
    match (field, raw_record) {
        (Some(field), Some(raw)) => format!(" (field: {:?}, raw record: {:?})", field, raw),
        (Some(field), None) => format!(" (field: {:?})", field),
        _ => String::new(),
    }
}

impl From<std::io::Error> for CsvError {
    fn from(error: std::io::Error) -> Self {
        CsvError::Io {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl CsvError {
    /// Create a Usage error
    pub fn usage(message: &str) -> Self {
        CsvError::Usage {
            message: message.to_string(),
        }
    }

    /// Create a Configuration error
    pub fn configuration(message: &str) -> Self {
        CsvError::Configuration {
            message: message.to_string(),
        }
    }

    /// Create a MissingField error for a lookup by index
    pub fn missing_index(row: u64, index: usize) -> Self {
        CsvError::MissingField {
            row,
            index,
            names: Vec::new(),
            message: format!("Field at index '{}' does not exist.", index),
        }
    }

    /// Create a MissingField error for a lookup by one or more header names
    ///
    /// The message names the occurrence index only when it is not the first one.
    pub fn missing_names(row: u64, names: &[&str], index: usize) -> Self {
        let index_text = if index > 0 {
            format!(" at field index '{}'", index)
        } else {
            String::new()
        };

        let message = match names {
            [] => format!("Field at index '{}' does not exist.", index),
            [name] => format!("Field with name '{}'{} does not exist.", name, index_text),
            _ => format!(
                "Field containing names '{}'{} does not exist.",
                names.join("' or '"),
                index_text
            ),
        };

        CsvError::MissingField {
            row,
            index,
            names: names.iter().map(|n| n.to_string()).collect(),
            message,
        }
    }

    /// Create a ColumnCountChange error
    pub fn column_count_change(row: u64, expected: usize, actual: usize) -> Self {
        CsvError::ColumnCountChange {
            row,
            expected,
            actual,
        }
    }

    /// Row number attached to a data-path error, if any
    pub fn row(&self) -> Option<u64> {
        match self {
            CsvError::BadData { row, .. }
            | CsvError::MissingField { row, .. }
            | CsvError::ColumnCountChange { row, .. }
            | CsvError::InvalidUtf8 { row } => Some(*row),
            CsvError::Usage { .. } | CsvError::Configuration { .. } | CsvError::Io { .. } => None,
        }
    }

    /// Whether this error came from the data rather than from API misuse or I/O
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            CsvError::BadData { .. }
                | CsvError::MissingField { .. }
                | CsvError::ColumnCountChange { .. }
                | CsvError::InvalidUtf8 { .. }
        )
    }
}
