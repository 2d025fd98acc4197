//! Output formatting for processed records
//!
//! The binary prints every record it reads in one of three formats:
//!
//! - **text**: fields joined with `", "`, one record per line
//! - **json**: one JSON value per line, an object keyed by header name when a
//!   header was read, an array otherwise
//! - **csv**: normalized CSV written back through [`CsvWriter`]
//!
//! Header names are made presentable first: trimmed, empty names replaced with
//! `Column N`, duplicates numbered.

use crate::cli::OutputFormat;
use crate::config::CsvConfig;
use crate::io::CsvWriter;
use crate::types::{CsvError, Record};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::io::Write;

/// Destination for processed records
pub trait RecordSink {
    /// Emit the (already de-duplicated) header names
    fn write_header(&mut self, names: &[String]) -> Result<(), CsvError>;

    /// Emit one record
    fn write_record(&mut self, record: &Record) -> Result<(), CsvError>;

    /// Flush anything still buffered
    fn finish(&mut self) -> Result<(), CsvError>;
}

/// Create the sink for an output format
///
/// # Arguments
///
/// * `format` - Output format selected on the command line
/// * `output` - Where the formatted records go
/// * `config` - Used by the CSV format for delimiter, quoting and newline
pub fn create_sink<'a>(
    format: OutputFormat,
    output: &'a mut dyn Write,
    config: &CsvConfig,
) -> Box<dyn RecordSink + 'a> {
    match format {
        OutputFormat::Text => Box::new(TextSink { output }),
        OutputFormat::Json => Box::new(JsonLinesSink {
            output,
            header: None,
        }),
        OutputFormat::Csv => Box::new(CsvSink {
            writer: CsvWriter::new(output, config.clone()),
        }),
    }
}

/// Make header names presentable and unique
///
/// Names are trimmed. An empty name becomes `Column N` (1-based position). A
/// name already used by an earlier column gets a numeric suffix one above the
/// largest `name K` suffix present anywhere in the header.
pub fn unique_header_names(header: &Record) -> Vec<String> {
    let mut names: Vec<String> = header.iter().map(|name| name.trim().to_string()).collect();

    for i in 0..names.len() {
        if names[i].is_empty() {
            names[i] = format!("Column {}", i + 1);
        } else if names[..i].contains(&names[i]) {
            let base = names[i].clone();
            let next = names
                .iter()
                .filter_map(|name| numbered_suffix(name, &base))
                .max()
                .map_or(1, |max| max + 1);
            names[i] = format!("{} {}", base, next);
        }
    }

    names
}

/// `K` when `name` is exactly `base K`
fn numbered_suffix(name: &str, base: &str) -> Option<u64> {
    let digits = name.strip_prefix(base)?.strip_prefix(' ')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

struct TextSink<'a> {
    output: &'a mut dyn Write,
}

impl RecordSink for TextSink<'_> {
    fn write_header(&mut self, names: &[String]) -> Result<(), CsvError> {
        writeln!(self.output, "{}", names.join(", "))?;
        Ok(())
    }

    fn write_record(&mut self, record: &Record) -> Result<(), CsvError> {
        writeln!(self.output, "{}", record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CsvError> {
        self.output.flush()?;
        Ok(())
    }
}

struct JsonLinesSink<'a> {
    output: &'a mut dyn Write,
    header: Option<Vec<String>>,
}

/// A record as a JSON object in column order; columns past the header are named
/// `Column N`
struct JsonObject<'a> {
    names: &'a [String],
    record: &'a Record,
}

impl Serialize for JsonObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.record.len()))?;
        for (i, value) in self.record.iter().enumerate() {
            match self.names.get(i) {
                Some(name) => map.serialize_entry(name, value)?,
                None => map.serialize_entry(&format!("Column {}", i + 1), value)?,
            }
        }
        map.end()
    }
}

struct JsonArray<'a>(&'a Record);

impl Serialize for JsonArray<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for value in self.0.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl RecordSink for JsonLinesSink<'_> {
    fn write_header(&mut self, names: &[String]) -> Result<(), CsvError> {
        self.header = Some(names.to_vec());
        Ok(())
    }

    fn write_record(&mut self, record: &Record) -> Result<(), CsvError> {
        let result = match &self.header {
            Some(names) => serde_json::to_writer(&mut *self.output, &JsonObject { names, record }),
            None => serde_json::to_writer(&mut *self.output, &JsonArray(record)),
        };
        result.map_err(|e| CsvError::Io {
            message: format!("Failed to write JSON: {}", e),
        })?;
        writeln!(self.output)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CsvError> {
        self.output.flush()?;
        Ok(())
    }
}

struct CsvSink<'a> {
    writer: CsvWriter<&'a mut dyn Write>,
}

impl RecordSink for CsvSink<'_> {
    fn write_header(&mut self, names: &[String]) -> Result<(), CsvError> {
        self.writer.write_header(names);
        self.writer.end_record()
    }

    fn write_record(&mut self, record: &Record) -> Result<(), CsvError> {
        self.writer.write_record(record)
    }

    fn finish(&mut self) -> Result<(), CsvError> {
        self.writer.flush()
    }
}
