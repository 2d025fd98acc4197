//! Blocking CSV parser
//!
//! Pulls blocks from any [`std::io::Read`] and feeds the tokenizer until a record
//! is complete.
//!
//! # Design
//!
//! The parser owns the reader, the block buffer and the tokenizer. A record is
//! handed out by shared reference and stays valid until the next call to
//! [`CsvParser::advance`]; the same storage is reused for every record.
//!
//! ```no_run
//! use rust_csv_engine::config::CsvConfig;
//! use rust_csv_engine::io::CsvParser;
//! use std::path::Path;
//!
//! let config = CsvConfig::builder(",").build().unwrap();
//! let mut parser = CsvParser::from_path(Path::new("data.csv"), config).unwrap();
//! while let Some(record) = parser.advance().unwrap() {
//!     println!("{}", record);
//! }
//! ```

use crate::config::CsvConfig;
use crate::core::tokenizer::Tokenizer;
use crate::core::traits::{RecordSource, RecordView};
use crate::io::block::BlockDecoder;
use crate::types::{CsvError, Record};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Blocking CSV parser over a byte reader
#[derive(Debug)]
pub struct CsvParser<R> {
    reader: R,
    decoder: BlockDecoder,
    tokenizer: Tokenizer,
}

impl CsvParser<File> {
    /// Open a file for parsing
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    /// * `config` - Parsing configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CsvParser)` if the file opened successfully
    /// * `Err(CsvError::Io)` if it could not be opened
    pub fn from_path(path: &Path, config: CsvConfig) -> Result<Self, CsvError> {
        let file = File::open(path).map_err(|e| CsvError::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;
        Ok(Self::new(file, config))
    }
}

impl<R: Read> CsvParser<R> {
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
    pub fn advance(&mut self) -> Result<Option<&Record>, CsvError> {
        if self.next_record()? {
            Ok(Some(self.tokenizer.record()))
        } else {
            Ok(None)
        }
    }

    fn next_record(&mut self) -> Result<bool, CsvError> {
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
            self.fill()?;
        }
    }

    fn fill(&mut self) -> Result<(), CsvError> {
        let read = loop {
            match self.reader.read(self.decoder.spare_mut()) {
                Ok(read) => break read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        self.decoder.commit(read, self.tokenizer.row() + 1)
    }
}

impl<R> CsvParser<R> {
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

impl<R> RecordView for CsvParser<R> {
    fn record(&self) -> &Record {
        CsvParser::record(self)
    }

    fn row(&self) -> u64 {
        CsvParser::row(self)
    }

    fn config(&self) -> &CsvConfig {
        CsvParser::config(self)
    }
}

impl<R: Read> RecordSource for CsvParser<R> {
    fn advance(&mut self) -> Result<Option<&Record>, CsvError> {
        CsvParser::advance(self)
    }
}
