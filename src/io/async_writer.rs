//! Asynchronous CSV writer
//!
//! Shares the formatter with [`CsvWriter`](crate::io::CsvWriter); only handing
//! the buffer to the sink is awaited. There is no flush on drop, so call
//! [`AsyncCsvWriter::close`] (or [`flush`](AsyncCsvWriter::flush)) when done.

use crate::config::CsvConfig;
use crate::core::formatter::RecordFormatter;
use crate::types::CsvError;
use futures::io::{AsyncWrite, AsyncWriteExt};

/// Asynchronous CSV writer over a byte sink
#[derive(Debug)]
pub struct AsyncCsvWriter<W> {
    formatter: RecordFormatter,
    sink: W,
}

impl<W: AsyncWrite + Unpin> AsyncCsvWriter<W> {
    pub fn new(sink: W, config: CsvConfig) -> Self {
        Self {
            formatter: RecordFormatter::new(config),
            sink,
        }
    }

    pub fn write_field(&mut self, field: &str) {
        self.formatter.write_field(field);
    }

    pub fn write_field_quoting(&mut self, field: &str, quote: bool) {
        self.formatter.write_field_quoting(field, quote);
    }

    pub fn write_header<I, T>(&mut self, names: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.formatter.write_header(names);
    }

    pub fn write_comment(&mut self, text: &str) {
        self.formatter.write_comment(text);
    }

    /// Write every field and end the record
    pub async fn write_record<I, T>(&mut self, fields: I) -> Result<(), CsvError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for field in fields {
            self.formatter.write_field(field.as_ref());
        }
        self.end_record().await
    }

    /// End the current record and write the buffer to the sink
    pub async fn end_record(&mut self) -> Result<(), CsvError> {
        self.formatter.end_record();
        self.flush_buffer().await
    }

    /// Write the buffer and flush the sink
    pub async fn flush(&mut self) -> Result<(), CsvError> {
        self.flush_buffer().await?;
        self.sink.flush().await?;
        Ok(())
    }

    /// Flush and close the sink
    pub async fn close(&mut self) -> Result<(), CsvError> {
        self.flush_buffer().await?;
        self.sink.close().await?;
        Ok(())
    }

    pub fn row(&self) -> u64 {
        self.formatter.row()
    }

    pub fn index(&self) -> usize {
        self.formatter.index()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.formatter.header()
    }

    /// Hand back the sink; anything not yet flushed is lost
    pub fn into_inner(self) -> W {
        self.sink
    }

    async fn flush_buffer(&mut self) -> Result<(), CsvError> {
        if self.formatter.pending().is_empty() {
            return Ok(());
        }
        self.sink
            .write_all(self.formatter.pending().as_bytes())
            .await?;
        self.formatter.clear_pending();
        Ok(())
    }
}
