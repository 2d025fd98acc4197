//! Processing strategy module
//!
//! A processing strategy is a complete pipeline: open the input file, tokenize it,
//! capture the header when one is configured, and hand every record to the output
//! sink. Implementations (blocking, tokio-driven) are selected at runtime and must
//! produce identical output for the same input.

use crate::cli::{OutputFormat, StrategyType};
use crate::config::CsvConfig;
use crate::core::traits::RecordView;
use crate::core::RecordReader;
use crate::io::output::{unique_header_names, RecordSink};
use crate::types::CsvError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::AsyncProcessingStrategy;
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete CSV pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Read every record from the input file and write it to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file
    /// * `output` - Writer receiving the formatted records
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the whole file was processed
    /// * `Err(CsvError)` if the file could not be opened, a data error was not
    ///   recovered by the configured strategies, or output could not be written
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), CsvError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Tokenizer and reader configuration
/// * `format` - How records are written to the output
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: CsvConfig,
    format: OutputFormat,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(config, format)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config, format)),
    }
}

/// Emit the first record read by a strategy
///
/// With header records enabled the record is captured as the header and its
/// presentable names go to the sink; otherwise it is an ordinary data record.
///
/// # Returns
///
/// The number of data records written (0 or 1)
fn emit_first<S: RecordView, K: RecordSink + ?Sized>(
    reader: &mut RecordReader<S>,
    sink: &mut K,
) -> Result<u64, CsvError> {
    if reader.config().has_header_record() {
        reader.read_header()?;
        if let Some(header) = reader.header() {
            sink.write_header(&unique_header_names(header))?;
        }
        Ok(0)
    } else {
        sink.write_record(reader.record()?)?;
        Ok(1)
    }
}
