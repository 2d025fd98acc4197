//! Asynchronous CSV parser
//!
//! Same tokenizer and block buffer as [`CsvParser`](crate::io::CsvParser), driven
//! by a [`futures::io::AsyncRead`]. The only suspension point is the block read,
//! and all parse state lives in the struct, so awaiting never leaves a record half
//! committed.
//!
//! # Architecture
//!
//! ```text
//! AsyncRead ──▶ BlockDecoder ──chars──▶ Tokenizer ──▶ Record
//! ```
//!
//! Tokio readers plug in through `tokio_util::compat`.

use crate::config::CsvConfig;
use crate::core::tokenizer::Tokenizer;
use crate::core::traits::RecordView;
use crate::io::block::BlockDecoder;
use crate::types::{CsvError, Record};
use futures::io::{AsyncRead, AsyncReadExt};

/// Asynchronous CSV parser over a byte reader
#[derive(Debug)]
pub struct AsyncCsvParser<R> {
    reader: R,
    decoder: BlockDecoder,
    tokenizer: Tokenizer,
}

impl<R: AsyncRead + Unpin> AsyncCsvParser<R> {
    pub fn new(reader: R, config: CsvConfig) -> Self {
        Self {
            reader,
            decoder: BlockDecoder::new(config.buffer_size()),
            tokenizer: Tokenizer::new(config),
        }
    }

    /// Read the next record
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - the next record
    /// * `Ok(None)` - end of input
    /// * `Err(CsvError)` - I/O failure, invalid UTF-8, or bad data the strategy
    ///   chose to fail on
    pub async fn advance(&mut self) -> Result<Option<&Record>, CsvError> {
        if self.next_record().await? {
            Ok(Some(self.tokenizer.record()))
        } else {
            Ok(None)
        }
    }

    async fn next_record(&mut self) -> Result<bool, CsvError> {
        self.tokenizer.begin_record();
        if self.tokenizer.drain()? {
            return Ok(true);
        }

        loop {
            while let Some(c) = self.decoder.next_char() {
                if self.tokenizer.feed(c)? {
                    return Ok(true);
                }
            }
            if self.decoder.is_eof() {
                return self.tokenizer.finish();
            }

            let read = self.reader.read(self.decoder.spare_mut()).await?;
            self.decoder.commit(read, self.tokenizer.row() + 1)?;
        }
    }
}

impl<R> AsyncCsvParser<R> {
    /// The current record
    pub fn record(&self) -> &Record {
        self.tokenizer.record()
    }

    /// 1-based physical row of the current record
    pub fn row(&self) -> u64 {
        self.tokenizer.row()
    }

    /// Number of fields in the current record
    pub fn count(&self) -> usize {
        self.tokenizer.record().len()
    }

    /// Raw text of the current record
    pub fn raw_record(&self) -> &str {
        self.tokenizer.raw_record()
    }

    pub fn config(&self) -> &CsvConfig {
        self.tokenizer.config()
    }
}

impl<R> RecordView for AsyncCsvParser<R> {
    fn record(&self) -> &Record {
        AsyncCsvParser::record(self)
    }

    fn row(&self) -> u64 {
        AsyncCsvParser::row(self)
    }

    fn config(&self) -> &CsvConfig {
        AsyncCsvParser::config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CsvParser;
    use futures::io::Cursor;
    use futures::FutureExt;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Reader that is not ready the first time it reaches `pause_at`
    struct PauseOnce {
        data: &'static [u8],
        pos: usize,
        pause_at: usize,
        paused: bool,
    }

    impl AsyncRead for PauseOnce {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut [u8],
        ) -> Poll<std::io::Result<usize>> {
            if self.pos == self.pause_at && !self.paused {
                self.paused = true;
                return Poll::Pending;
            }
            let n = buf.len().min(self.data.len() - self.pos);
            let start = self.pos;
            buf[..n].copy_from_slice(&self.data[start..start + n]);
            self.pos += n;
            Poll::Ready(Ok(n))
        }
    }

    const INPUT: &str = "a,b,c\r\n\"x\"\"y\",\"multi\nline\",\n#skipped\n1,2,3";

    async fn parse_async(input: &str, buffer_size: usize) -> Vec<Vec<String>> {
        let config = CsvConfig::builder(",")
            .allow_comments(true)
            .buffer_size(buffer_size)
            .build()
            .unwrap();
        let mut parser = AsyncCsvParser::new(Cursor::new(input.as_bytes()), config);
        let mut records = Vec::new();
        while let Some(record) = parser.advance().await.unwrap() {
            records.push(record.to_vec());
        }
        records
    }

    #[tokio::test]
    async fn test_async_parser_reads_records() {
        let records = parse_async(INPUT, 4096).await;
        assert_eq!(
            records,
            vec![
                vec!["a", "b", "c"],
                vec!["x\"y", "multi\nline", ""],
                vec!["1", "2", "3"],
            ]
        );
    }

    #[tokio::test]
    async fn test_async_parser_matches_blocking_parser() {
        let config = CsvConfig::builder(",").allow_comments(true).build().unwrap();
        let mut blocking = CsvParser::new(std::io::Cursor::new(INPUT), config);
        let mut expected = Vec::new();
        while let Some(record) = blocking.advance().unwrap() {
            expected.push(record.to_vec());
        }

        for buffer_size in [1, 3, 8] {
            assert_eq!(parse_async(INPUT, buffer_size).await, expected);
        }
    }

    #[tokio::test]
    async fn test_async_parser_row_tracking() {
        let config = CsvConfig::builder(",").allow_comments(true).build().unwrap();
        let mut parser = AsyncCsvParser::new(Cursor::new(INPUT.as_bytes()), config);

        parser.advance().await.unwrap();
        parser.advance().await.unwrap();
        assert_eq!(parser.row(), 2);
        assert_eq!(parser.count(), 3);

        parser.advance().await.unwrap();
        assert_eq!(parser.row(), 4);
        assert!(parser.advance().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_advance_resumes_record() {
        let config = CsvConfig::builder(",").buffer_size(2).build().unwrap();
        let reader = PauseOnce {
            data: b"a,b,c\nd\n",
            pos: 0,
            pause_at: 2,
            paused: false,
        };
        let mut parser = AsyncCsvParser::new(reader, config);

        // The first call stops at the pending read and is dropped
        assert!(parser.advance().now_or_never().is_none());

        let record = parser.advance().await.unwrap().map(|r| r.to_vec());
        assert_eq!(record, Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]));
        let record = parser.advance().await.unwrap().map(|r| r.to_vec());
        assert_eq!(record, Some(vec!["d".to_string()]));
        assert!(parser.advance().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_async_parser_bad_data_fails() {
        let config = CsvConfig::builder(",").build().unwrap();
        let mut parser = AsyncCsvParser::new(Cursor::new(&b"a,\"open"[..]), config);
        let error = parser.advance().await.unwrap_err();
        assert!(matches!(error, CsvError::BadData { row: 1, .. }));
    }
}
