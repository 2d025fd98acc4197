//! Configuration for the tokenizer, reader and writer
//!
//! A [`CsvConfig`] is produced once by [`CsvConfigBuilder`] and never changes
//! afterwards. Strategies are plain function values captured at build time; the
//! only process-wide defaults are the constants in [`defaults`].
//!
//! ```
//! use rust_csv_engine::config::{CsvConfig, TrimOptions};
//! use rust_csv_engine::types::Recovery;
//!
//! let config = CsvConfig::builder(";")
//!     .allow_comments(true)
//!     .trim_options(TrimOptions::TRIM)
//!     .missing_field_found(|_| Recovery::Continue)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.delimiter(), ";");
//! ```

mod options;

pub use options::CsvOptions;

use crate::types::{
    BadDataArgs, CsvError, MissingFieldArgs, PrepareHeaderArgs, ReadingExceptionArgs, Recovery,
    ShouldSkipRecordArgs,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Strategy invoked when the tokenizer finds malformed quoting
pub type BadDataFound = Arc<dyn Fn(&BadDataArgs<'_>) -> Recovery + Send + Sync>;
/// Strategy invoked when a requested field does not exist
pub type MissingFieldFound = Arc<dyn Fn(&MissingFieldArgs<'_>) -> Recovery + Send + Sync>;
/// Strategy invoked when the reader detects an error such as a column count change
pub type ReadingExceptionOccurred =
    Arc<dyn Fn(&ReadingExceptionArgs<'_>) -> Recovery + Send + Sync>;
/// Predicate deciding whether a tokenized record is hidden from the reader
pub type ShouldSkipRecord = Arc<dyn Fn(&ShouldSkipRecordArgs<'_>) -> bool + Send + Sync>;
/// Normalization applied to header names and requested names before matching
pub type PrepareHeaderForMatch = Arc<dyn Fn(&PrepareHeaderArgs<'_>) -> String + Send + Sync>;

/// Compile-time defaults
pub mod defaults {
    use crate::types::{
        BadDataArgs, MissingFieldArgs, PrepareHeaderArgs, ReadingExceptionArgs, Recovery,
        ShouldSkipRecordArgs,
    };

    pub const QUOTE: char = '"';
    pub const ESCAPE: char = '"';
    pub const COMMENT: char = '#';
    /// Newline written when none is pinned
    pub const WRITE_NEW_LINE: &str = "\r\n";
    pub const BUFFER_SIZE: usize = 0x1000;
    pub const HAS_HEADER_RECORD: bool = true;
    pub const IGNORE_BLANK_LINES: bool = true;
    pub const EXCEPTION_MESSAGES_CONTAIN_RAW_DATA: bool = true;
    /// Characters removed by trimming
    pub const WHITESPACE: &[char] = &[' ', '\t'];
    /// Characters the reader accepts as line endings when no newline is pinned
    pub const LINE_ENDING_CHARS: &[char] = &['\r', '\n'];

    pub fn bad_data_found(_args: &BadDataArgs<'_>) -> Recovery {
        Recovery::Fail
    }

    pub fn missing_field_found(_args: &MissingFieldArgs<'_>) -> Recovery {
        Recovery::Fail
    }

    pub fn reading_exception_occurred(_args: &ReadingExceptionArgs<'_>) -> Recovery {
        Recovery::Fail
    }

    pub fn should_skip_record(_args: &ShouldSkipRecordArgs<'_>) -> bool {
        false
    }

    pub fn prepare_header_for_match(args: &PrepareHeaderArgs<'_>) -> String {
        args.header.to_string()
    }
}

/// Field trimming options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimOptions {
    /// Trim whitespace around unquoted fields and outside quotes
    pub trim: bool,
    /// Trim whitespace inside quoted fields
    pub inside_quotes: bool,
}

impl TrimOptions {
    pub const NONE: TrimOptions = TrimOptions {
        trim: false,
        inside_quotes: false,
    };
    pub const TRIM: TrimOptions = TrimOptions {
        trim: true,
        inside_quotes: false,
    };
    pub const INSIDE_QUOTES: TrimOptions = TrimOptions {
        trim: false,
        inside_quotes: true,
    };
    pub const ALL: TrimOptions = TrimOptions {
        trim: true,
        inside_quotes: true,
    };
}

/// How the data reader compares prepared names when an exact lookup fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderComparison {
    /// No fallback: only exact matches of prepared names resolve
    Ordinal,
    /// Fall back to a case-insensitive comparison of prepared names
    #[default]
    IgnoreCase,
}

impl HeaderComparison {
    /// Whether two prepared names are considered equal
    pub fn matches(self, left: &str, right: &str) -> bool {
        match self {
            HeaderComparison::Ordinal => left == right,
            HeaderComparison::IgnoreCase => left.to_lowercase() == right.to_lowercase(),
        }
    }
}

/// Immutable configuration shared by the parser, reader and writer
#[derive(Clone)]
pub struct CsvConfig {
    delimiter: String,
    quote: char,
    escape: char,
    comment: char,
    allow_comments: bool,
    new_line: Option<String>,
    buffer_size: usize,
    has_header_record: bool,
    ignore_blank_lines: bool,
    trim_options: TrimOptions,
    header_comparison: HeaderComparison,
    detect_column_count_changes: bool,
    exception_messages_contain_raw_data: bool,
    prepare_header_for_match: PrepareHeaderForMatch,
    missing_field_found: MissingFieldFound,
    bad_data_found: BadDataFound,
    reading_exception_occurred: ReadingExceptionOccurred,
    should_skip_record: ShouldSkipRecord,
}

impl CsvConfig {
    /// Start building a configuration
    ///
    /// The delimiter is required: there is no shared default between reading and
    /// writing.
    pub fn builder(delimiter: &str) -> CsvConfigBuilder {
        CsvConfigBuilder::new(delimiter)
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn quote(&self) -> char {
        self.quote
    }

    pub fn escape(&self) -> char {
        self.escape
    }

    pub fn comment(&self) -> char {
        self.comment
    }

    pub fn allow_comments(&self) -> bool {
        self.allow_comments
    }

    /// The pinned newline, if one was set explicitly
    pub fn new_line(&self) -> Option<&str> {
        self.new_line.as_deref()
    }

    /// The newline the writer emits
    pub fn write_new_line(&self) -> &str {
        self.new_line.as_deref().unwrap_or(defaults::WRITE_NEW_LINE)
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn has_header_record(&self) -> bool {
        self.has_header_record
    }

    pub fn ignore_blank_lines(&self) -> bool {
        self.ignore_blank_lines
    }

    pub fn trim_options(&self) -> TrimOptions {
        self.trim_options
    }

    pub fn header_comparison(&self) -> HeaderComparison {
        self.header_comparison
    }

    pub fn detect_column_count_changes(&self) -> bool {
        self.detect_column_count_changes
    }

    pub fn exception_messages_contain_raw_data(&self) -> bool {
        self.exception_messages_contain_raw_data
    }

    /// Apply the header preparation function
    pub fn prepare_header(&self, header: &str, position: usize) -> String {
        (self.prepare_header_for_match)(&PrepareHeaderArgs { header, position })
    }

    pub fn on_missing_field(&self, args: &MissingFieldArgs<'_>) -> Recovery {
        (self.missing_field_found)(args)
    }

    pub fn on_bad_data(&self, args: &BadDataArgs<'_>) -> Recovery {
        (self.bad_data_found)(args)
    }

    pub fn on_reading_exception(&self, args: &ReadingExceptionArgs<'_>) -> Recovery {
        (self.reading_exception_occurred)(args)
    }

    pub fn should_skip(&self, args: &ShouldSkipRecordArgs<'_>) -> bool {
        (self.should_skip_record)(args)
    }
}

impl fmt::Debug for CsvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvConfig")
            .field("delimiter", &self.delimiter)
            .field("quote", &self.quote)
            .field("escape", &self.escape)
            .field("comment", &self.comment)
            .field("allow_comments", &self.allow_comments)
            .field("new_line", &self.new_line)
            .field("buffer_size", &self.buffer_size)
            .field("has_header_record", &self.has_header_record)
            .field("ignore_blank_lines", &self.ignore_blank_lines)
            .field("trim_options", &self.trim_options)
            .field("header_comparison", &self.header_comparison)
            .field(
                "detect_column_count_changes",
                &self.detect_column_count_changes,
            )
            .finish_non_exhaustive()
    }
}

/// Builder for [`CsvConfig`]
#[derive(Clone)]
pub struct CsvConfigBuilder {
    config: CsvConfig,
}

impl CsvConfigBuilder {
    /// Create a builder with the given delimiter and every other option at its default
    pub fn new(delimiter: &str) -> Self {
        Self {
            config: CsvConfig {
                delimiter: delimiter.to_string(),
                quote: defaults::QUOTE,
                escape: defaults::ESCAPE,
                comment: defaults::COMMENT,
                allow_comments: false,
                new_line: None,
                buffer_size: defaults::BUFFER_SIZE,
                has_header_record: defaults::HAS_HEADER_RECORD,
                ignore_blank_lines: defaults::IGNORE_BLANK_LINES,
                trim_options: TrimOptions::NONE,
                header_comparison: HeaderComparison::default(),
                detect_column_count_changes: false,
                exception_messages_contain_raw_data: defaults::EXCEPTION_MESSAGES_CONTAIN_RAW_DATA,
                prepare_header_for_match: Arc::new(defaults::prepare_header_for_match),
                missing_field_found: Arc::new(defaults::missing_field_found),
                bad_data_found: Arc::new(defaults::bad_data_found),
                reading_exception_occurred: Arc::new(defaults::reading_exception_occurred),
                should_skip_record: Arc::new(defaults::should_skip_record),
            },
        }
    }

    pub fn quote(mut self, quote: char) -> Self {
        self.config.quote = quote;
        self
    }

    pub fn escape(mut self, escape: char) -> Self {
        self.config.escape = escape;
        self
    }

    pub fn comment(mut self, comment: char) -> Self {
        self.config.comment = comment;
        self
    }

    pub fn allow_comments(mut self, allow: bool) -> Self {
        self.config.allow_comments = allow;
        self
    }

    /// Pin the newline: reading then only accepts this exact string as a record
    /// terminator, and writing emits it
    pub fn new_line(mut self, new_line: &str) -> Self {
        self.config.new_line = Some(new_line.to_string());
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    pub fn has_header_record(mut self, has_header: bool) -> Self {
        self.config.has_header_record = has_header;
        self
    }

    pub fn ignore_blank_lines(mut self, ignore: bool) -> Self {
        self.config.ignore_blank_lines = ignore;
        self
    }

    pub fn trim_options(mut self, options: TrimOptions) -> Self {
        self.config.trim_options = options;
        self
    }

    pub fn header_comparison(mut self, comparison: HeaderComparison) -> Self {
        self.config.header_comparison = comparison;
        self
    }

    pub fn detect_column_count_changes(mut self, detect: bool) -> Self {
        self.config.detect_column_count_changes = detect;
        self
    }

    pub fn exception_messages_contain_raw_data(mut self, contain: bool) -> Self {
        self.config.exception_messages_contain_raw_data = contain;
        self
    }

    pub fn prepare_header_for_match<F>(mut self, f: F) -> Self
    where
        F: Fn(&PrepareHeaderArgs<'_>) -> String + Send + Sync + 'static,
    {
        self.config.prepare_header_for_match = Arc::new(f);
        self
    }

    pub fn missing_field_found<F>(mut self, f: F) -> Self
    where
        F: Fn(&MissingFieldArgs<'_>) -> Recovery + Send + Sync + 'static,
    {
        self.config.missing_field_found = Arc::new(f);
        self
    }

    pub fn bad_data_found<F>(mut self, f: F) -> Self
    where
        F: Fn(&BadDataArgs<'_>) -> Recovery + Send + Sync + 'static,
    {
        self.config.bad_data_found = Arc::new(f);
        self
    }

    pub fn reading_exception_occurred<F>(mut self, f: F) -> Self
    where
        F: Fn(&ReadingExceptionArgs<'_>) -> Recovery + Send + Sync + 'static,
    {
        self.config.reading_exception_occurred = Arc::new(f);
        self
    }

    pub fn should_skip_record<F>(mut self, f: F) -> Self
    where
        F: Fn(&ShouldSkipRecordArgs<'_>) -> bool + Send + Sync + 'static,
    {
        self.config.should_skip_record = Arc::new(f);
        self
    }

    /// Let every data error pass: bad data is kept as read, missing fields come
    /// back absent, column count changes are accepted
    pub fn lenient(self) -> Self {
        self.bad_data_found(|_| Recovery::Continue)
            .missing_field_found(|_| Recovery::Continue)
            .reading_exception_occurred(|_| Recovery::Continue)
    }

    /// Validate the settings and produce the configuration
    pub fn build(self) -> Result<CsvConfig, CsvError> {
        let config = self.config;

        if config.delimiter.is_empty() {
            return Err(CsvError::configuration("delimiter must not be empty"));
        }
        if config.delimiter.contains(config.quote) {
            return Err(CsvError::configuration(
                "delimiter must not contain the quote character",
            ));
        }
        if config.delimiter.contains(defaults::LINE_ENDING_CHARS) {
            return Err(CsvError::configuration(
                "delimiter must not contain a line ending character",
            ));
        }
        if let Some(new_line) = &config.new_line {
            if new_line.is_empty() {
                return Err(CsvError::configuration("new_line must not be empty"));
            }
            if new_line.contains(config.quote) {
                return Err(CsvError::configuration(
                    "new_line must not contain the quote character",
                ));
            }
        }
        if config.allow_comments && config.comment == config.quote {
            return Err(CsvError::configuration(
                "comment character must differ from the quote character",
            ));
        }
        if config.buffer_size == 0 {
            return Err(CsvError::configuration("buffer_size must be at least 1"));
        }

        Ok(config)
    }
}
