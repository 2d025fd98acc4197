use crate::config::{CsvOptions, TrimOptions};
use crate::types::CsvError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Tokenize a CSV file and print its records
#[derive(Parser, Debug)]
#[command(name = "csv-engine")]
#[command(about = "Tokenize a CSV file and print its records", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Reading strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Reading strategy: 'sync' for blocking reads or 'async' for a tokio runtime"
    )]
    pub strategy: StrategyType,

    /// Output format
    #[arg(
        long = "format",
        value_name = "FORMAT",
        default_value = "text",
        help = "Output format: 'text', 'json' (one value per line) or 'csv'"
    )]
    pub format: OutputFormat,

    /// JSON file with reader options; command-line flags override it
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long = "delimiter", value_name = "DELIMITER", help = "Field delimiter (may be several characters)")]
    pub delimiter: Option<String>,

    #[arg(long = "quote", value_name = "CHAR")]
    pub quote: Option<char>,

    #[arg(long = "allow-comments", help = "Skip lines starting with the comment character")]
    pub allow_comments: bool,

    #[arg(long = "buffer-size", value_name = "BYTES", help = "Size of each block read from the input")]
    pub buffer_size: Option<usize>,

    #[arg(long = "no-header", help = "Treat the first record as data")]
    pub no_header: bool,

    #[arg(long = "detect-column-count-changes")]
    pub detect_column_count_changes: bool,

    #[arg(long = "trim", help = "Trim spaces and tabs around fields")]
    pub trim: bool,

    #[arg(long = "lenient", help = "Keep going on bad data and column count changes")]
    pub lenient: bool,
}

/// Available reading strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available output formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl CliArgs {
    /// Build reader options from the `--config` file (or defaults) and the
    /// command-line overrides
    ///
    /// Flags only ever switch options on; an option enabled in the file cannot be
    /// disabled from the command line.
    pub fn to_options(&self) -> Result<CsvOptions, CsvError> {
        let mut options = match &self.config {
            Some(path) => CsvOptions::from_json_file(path)?,
            None => CsvOptions::default(),
        };

        if let Some(delimiter) = &self.delimiter {
            options.delimiter = delimiter.clone();
        }
        if let Some(quote) = self.quote {
            options.quote = quote;
            options.escape = quote;
        }
        if let Some(buffer_size) = self.buffer_size {
            options.buffer_size = buffer_size;
        }
        if self.allow_comments {
            options.allow_comments = true;
        }
        if self.no_header {
            options.has_header_record = false;
        }
        if self.detect_column_count_changes {
            options.detect_column_count_changes = true;
        }
        if self.trim {
            options.trim = TrimOptions::TRIM;
        }
        if self.lenient {
            options.lenient = true;
        }

        Ok(options)
    }
}
