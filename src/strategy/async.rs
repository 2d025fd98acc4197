//! Asynchronous processing strategy
//!
//! Same pipeline as the synchronous strategy, driven on a tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── tokio multi-thread runtime
//!     ├── tokio::fs::File ── compat ──> futures::io::AsyncRead
//!     ├── AsyncCsvParser (awaits only on block reads)
//!     ├── RecordReader::read_async (header capture, column checks)
//!     └── RecordSink (text / json / csv)
//! ```
//!
//! Records are written to the sink in input order, so the output is byte-identical
//! to the synchronous strategy.

use crate::cli::OutputFormat;
use crate::config::CsvConfig;
use crate::core::RecordReader;
use crate::io::output::create_sink;
use crate::io::AsyncCsvParser;
use crate::strategy::{emit_first, ProcessingStrategy};
use crate::types::CsvError;
use std::io::Write;
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::info;

/// Asynchronous processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: CsvConfig,
    format: OutputFormat,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - Tokenizer and reader configuration
    /// * `format` - How records are written to the output
    pub fn new(config: CsvConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), CsvError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .build()
            .map_err(|e| CsvError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| CsvError::Io {
                    message: format!("Failed to open file '{}': {}", input_path.display(), e),
                })?;

            let parser = AsyncCsvParser::new(file.compat(), self.config.clone());
            let mut reader = RecordReader::new(parser);
            let mut sink = create_sink(self.format, output, &self.config);

            let mut records = 0;
            if reader.read_async().await? {
                records += emit_first(&mut reader, sink.as_mut())?;
                while reader.read_async().await? {
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
        })
    }
}
