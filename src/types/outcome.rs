//! Strategy arguments and outcomes
//!
//! Every recoverable condition is reported to a strategy with one of the
//! argument structs below, and the strategy answers with a [`Recovery`].
//! Field lookups hand back a [`FieldValue`] so a placeholder or an absent
//! field is an ordinary value rather than an error.

use crate::types::{CsvError, Record};

/// What a strategy wants done with a recoverable data condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Abort the operation with the corresponding error
    Fail,
    /// Keep going: keep bad data as read, report a missing field as absent,
    /// or accept a changed column count
    Continue,
    /// Keep going with this value in place of the affected field
    Substitute(String),
}

/// Result of a successful field lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// The field exists in the current record
    Value(&'a str),
    /// The field is missing and the strategy supplied a placeholder
    Placeholder(String),
    /// The field is missing and the strategy chose to continue without a value
    Missing,
}

impl<'a> FieldValue<'a> {
    /// The text of the field or placeholder, `None` when missing
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Value(value) => Some(value),
            FieldValue::Placeholder(value) => Some(value.as_str()),
            FieldValue::Missing => None,
        }
    }

    /// Whether the field came from the record itself
    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Value(_))
    }

    /// Whether the lookup found nothing and no placeholder was supplied
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Convert into an owned string, `None` when missing
    pub fn into_owned(self) -> Option<String> {
        match self {
            FieldValue::Value(value) => Some(value.to_string()),
            FieldValue::Placeholder(value) => Some(value),
            FieldValue::Missing => None,
        }
    }
}

/// Context handed to the bad-data strategy
#[derive(Debug, Clone, Copy)]
pub struct BadDataArgs<'a> {
    /// 1-based row being tokenized
    pub row: u64,
    /// 0-based index of the field being tokenized
    pub field_index: usize,
    /// Field text read so far
    pub field: &'a str,
    /// Raw text of the record read so far
    pub raw_record: &'a str,
    /// Description of the problem
    pub message: &'a str,
}

/// Context handed to the missing-field strategy
#[derive(Debug, Clone, Copy)]
pub struct MissingFieldArgs<'a> {
    /// Requested header names, empty for lookups by index
    pub names: &'a [&'a str],
    /// Requested field index, or occurrence index for name lookups
    pub index: usize,
    /// 1-based row of the current record
    pub row: u64,
}

/// Context handed to the reading-exception strategy
#[derive(Debug, Clone, Copy)]
pub struct ReadingExceptionArgs<'a> {
    /// The error that would be returned
    pub error: &'a CsvError,
    /// 1-based row of the current record
    pub row: u64,
}

/// Context handed to the skip predicate
#[derive(Debug, Clone, Copy)]
pub struct ShouldSkipRecordArgs<'a> {
    /// The record just tokenized
    pub record: &'a Record,
    /// 1-based physical row of the record
    pub row: u64,
}

/// Context handed to the header preparation function
#[derive(Debug, Clone, Copy)]
pub struct PrepareHeaderArgs<'a> {
    /// Header name, or a requested name
    pub header: &'a str,
    /// Column position of a header name, or the position in a list of requested names
    pub position: usize,
}
