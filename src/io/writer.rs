//! Blocking CSV writer
//!
//! Fields are formatted into an in-memory buffer; the buffer is handed to the
//! sink at the end of every record and on [`CsvWriter::flush`]. Dropping the
//! writer flushes whatever is left.

use crate::config::CsvConfig;
use crate::core::formatter::RecordFormatter;
use crate::types::CsvError;
use std::io::Write;
use tracing::error;

/// Blocking CSV writer over a byte sink
#[derive(Debug)]
pub struct CsvWriter<W: Write> {
    formatter: RecordFormatter,
    sink: Option<W>,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(sink: W, config: CsvConfig) -> Self {
        Self {
            formatter: RecordFormatter::new(config),
            sink: Some(sink),
        }
    }

    /// Write a field, quoting it when needed
    pub fn write_field(&mut self, field: &str) {
        self.formatter.write_field(field);
    }

    /// Write a field, quoting it only when `quote` is set
    pub fn write_field_quoting(&mut self, field: &str, quote: bool) {
        self.formatter.write_field_quoting(field, quote);
    }

    /// Write header names as fields of the current record
    pub fn write_header<I, T>(&mut self, names: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.formatter.write_header(names);
    }

    /// Write the comment character followed by `text`
    pub fn write_comment(&mut self, text: &str) {
        self.formatter.write_comment(text);
    }

    /// Write every field and end the record
    pub fn write_record<I, T>(&mut self, fields: I) -> Result<(), CsvError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for field in fields {
            self.formatter.write_field(field.as_ref());
        }
        self.end_record()
    }

    /// End the current record and write the buffer to the sink
    pub fn end_record(&mut self) -> Result<(), CsvError> {
        self.formatter.end_record();
        self.flush_buffer()
    }

    /// Write the buffer and flush the sink
    pub fn flush(&mut self) -> Result<(), CsvError> {
        self.flush_buffer()?;
        self.sink()?.flush()?;
        Ok(())
    }

    /// 1-based row being written
    pub fn row(&self) -> u64 {
        self.formatter.row()
    }

    /// Number of fields written to the current record
    pub fn index(&self) -> usize {
        self.formatter.index()
    }

    /// Names passed to the last `write_header`
    pub fn header(&self) -> Option<&[String]> {
        self.formatter.header()
    }

    pub fn config(&self) -> &CsvConfig {
        self.formatter.config()
    }

    /// Flush and hand back the sink
    pub fn into_inner(mut self) -> Result<W, CsvError> {
        self.flush()?;
        self.sink
            .take()
            .ok_or_else(|| CsvError::usage("The writer no longer owns its sink."))
    }

    fn flush_buffer(&mut self) -> Result<(), CsvError> {
        if self.formatter.pending().is_empty() {
            return Ok(());
        }
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| CsvError::usage("The writer no longer owns its sink."))?;
        sink.write_all(self.formatter.pending().as_bytes())?;
        self.formatter.clear_pending();
        Ok(())
    }

    fn sink(&mut self) -> Result<&mut W, CsvError> {
        self.sink
            .as_mut()
            .ok_or_else(|| CsvError::usage("The writer no longer owns its sink."))
    }
}

impl<W: Write> Drop for CsvWriter<W> {
    fn drop(&mut self) {
        if self.sink.is_some() {
            if let Err(e) = self.flush() {
                error!("failed to flush CSV writer on drop: {}", e);
            }
        }
    }
}
