//! Plain-data options that can be stored in a JSON file
//!
//! Everything in [`CsvConfig`] that is not a callable has a field here. The
//! binary loads these from `--config` and then applies command-line overrides.

use crate::config::{defaults, CsvConfig, CsvConfigBuilder, HeaderComparison, TrimOptions};
use crate::types::CsvError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvOptions {
    pub delimiter: String,
    pub quote: char,
    pub escape: char,
    pub comment: char,
    pub allow_comments: bool,
    pub new_line: Option<String>,
    pub buffer_size: usize,
    pub has_header_record: bool,
    pub ignore_blank_lines: bool,
    pub trim: TrimOptions,
    pub header_comparison: HeaderComparison,
    pub detect_column_count_changes: bool,
    /// Lowercase header names and requested names before matching
    pub ignore_header_case: bool,
    /// Let data errors pass instead of aborting (see [`CsvConfigBuilder::lenient`])
    pub lenient: bool,
    pub exception_messages_contain_raw_data: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            quote: defaults::QUOTE,
            escape: defaults::ESCAPE,
            comment: defaults::COMMENT,
            allow_comments: false,
            new_line: None,
            buffer_size: defaults::BUFFER_SIZE,
            has_header_record: defaults::HAS_HEADER_RECORD,
            ignore_blank_lines: defaults::IGNORE_BLANK_LINES,
            trim: TrimOptions::NONE,
            header_comparison: HeaderComparison::default(),
            detect_column_count_changes: false,
            ignore_header_case: false,
            lenient: false,
            exception_messages_contain_raw_data: defaults::EXCEPTION_MESSAGES_CONTAIN_RAW_DATA,
        }
    }
}

impl CsvOptions {
    /// Parse options from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, CsvError> {
        serde_json::from_str(json)
            .map_err(|e| CsvError::configuration(&format!("invalid options: {}", e)))
    }

    /// Load options from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, CsvError> {
        let json = fs::read_to_string(path).map_err(|e| {
            CsvError::configuration(&format!(
                "failed to read options file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Turn the options into a builder, ready for further customization
    pub fn to_builder(&self) -> CsvConfigBuilder {
        let mut builder = CsvConfig::builder(&self.delimiter)
            .quote(self.quote)
            .escape(self.escape)
            .comment(self.comment)
            .allow_comments(self.allow_comments)
            .buffer_size(self.buffer_size)
            .has_header_record(self.has_header_record)
            .ignore_blank_lines(self.ignore_blank_lines)
            .trim_options(self.trim)
            .header_comparison(self.header_comparison)
            .detect_column_count_changes(self.detect_column_count_changes)
            .exception_messages_contain_raw_data(self.exception_messages_contain_raw_data);

        if let Some(new_line) = &self.new_line {
            builder = builder.new_line(new_line);
        }
        if self.ignore_header_case {
            builder = builder.prepare_header_for_match(|args| args.header.to_lowercase());
        }
        if self.lenient {
            builder = builder.lenient();
        }

        builder
    }

    /// Build a validated configuration from the options
    pub fn build(&self) -> Result<CsvConfig, CsvError> {
        self.to_builder().build()
    }
}
