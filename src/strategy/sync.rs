//! Synchronous processing strategy
//!
//! Streams the input file through a blocking [`CsvParser`] and a
//! [`RecordReader`], writing each record to the output sink as soon as it is read.
//!
//! # Design
//!
//! The strategy only orchestrates:
//! - tokenizing is done by `CsvParser` (block reads of `buffer_size` bytes)
//! - header capture and column checks by `RecordReader`
//! - formatting by the sink from `io::output`
//!
//! Memory use is bounded by the block buffer and the longest record, not the file.

use crate::cli::OutputFormat;
use crate::config::CsvConfig;
use crate::core::RecordReader;
use crate::io::output::create_sink;
use crate::io::CsvParser;
use crate::strategy::{emit_first, ProcessingStrategy};
use crate::types::CsvError;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_csv_engine::cli::OutputFormat;
/// use rust_csv_engine::config::CsvConfig;
/// use rust_csv_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let config = CsvConfig::builder(",").build().unwrap();
/// let strategy = SyncProcessingStrategy::new(config, OutputFormat::Json);
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("input.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone)]
pub struct SyncProcessingStrategy {
    config: CsvConfig,
    format: OutputFormat,
}

impl SyncProcessingStrategy {
    pub fn new(config: CsvConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), CsvError> {
        let parser = CsvParser::from_path(input_path, self.config.clone())?;
        let mut reader = RecordReader::new(parser);
        let mut sink = create_sink(self.format, output, &self.config);

        let mut records = 0;
        if reader.read()? {
            records += emit_first(&mut reader, sink.as_mut())?;
            while reader.read()? {
                sink.write_record(reader.record()?)?;
                records += 1;
            }
        }
        sink.finish()?;

        info!(
            path = %input_path.display(),
            records,
            rows = reader.parser().row(),
            "finished processing"
        );
        Ok(())
    }
}
