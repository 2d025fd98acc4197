//! Tabular view over a record reader
//!
//! Positions the reader on construction (capturing the header when header records
//! are enabled) and then exposes the current row as a table row: field count,
//! column names, ordinals, values and null checks.

use crate::core::reader::RecordReader;
use crate::core::traits::RecordSource;
use crate::types::{CsvError, FieldValue};

/// Table-row access on top of [`RecordReader`]
#[derive(Debug)]
pub struct DataReader<S> {
    reader: RecordReader<S>,
    skip_next_read: bool,
    null_values: Vec<String>,
}

impl<S: RecordSource> DataReader<S> {
    /// Wrap a reader, reading the header row if there is one
    ///
    /// Without a header record the first row is already read, and the first call
    /// to [`read`](Self::read) only reports it.
    pub fn new(mut reader: RecordReader<S>) -> Result<Self, CsvError> {
        let has_first = reader.read()?;
        let mut skip_next_read = false;

        if reader.config().has_header_record() {
            if has_first {
                reader.read_header()?;
            }
        } else {
            skip_next_read = has_first;
        }

        Ok(Self {
            reader,
            skip_next_read,
            null_values: Vec::new(),
        })
    }

    /// Field values that [`is_null`](Self::is_null) treats as null
    pub fn with_null_values<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.null_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Move to the next data row
    pub fn read(&mut self) -> Result<bool, CsvError> {
        if self.skip_next_read {
            self.skip_next_read = false;
            return Ok(true);
        }
        self.reader.read()
    }

    /// Number of fields in the current row
    pub fn field_count(&self) -> usize {
        self.reader.parser().record().len()
    }

    /// Header name of column `i`, `None` without a header or out of range
    pub fn name(&self, i: usize) -> Option<&str> {
        self.reader.header().and_then(|header| header.get(i))
    }

    /// Column position for a header name
    ///
    /// Tries an exact lookup of the prepared name first, then compares the
    /// prepared name with every prepared header name using the configured
    /// [`HeaderComparison`](crate::config::HeaderComparison).
    pub fn ordinal(&mut self, name: &str) -> Result<usize, CsvError> {
        if let Some(index) = self.reader.try_field_index(&[name], 0)? {
            return Ok(index);
        }

        let config = self.reader.config();
        let prepared = config.prepare_header(name, 0);
        let comparison = config.header_comparison();
        let found = self.reader.header().and_then(|header| {
            header
                .iter()
                .enumerate()
                .position(|(i, header_name)| {
                    comparison.matches(&prepared, &config.prepare_header(header_name, i))
                })
        });

        found.ok_or_else(|| CsvError::MissingField {
            row: self.reader.row(),
            index: 0,
            names: vec![name.to_string()],
            message: format!(
                "Field with name '{}' and prepared name '{}' was not found.",
                name, prepared
            ),
        })
    }

    /// Field `i` of the current row
    pub fn get(&mut self, i: usize) -> Result<FieldValue<'_>, CsvError> {
        self.reader.field(i)
    }

    /// Every field of the current row, `None` for null values
    pub fn values(&mut self) -> Result<Vec<Option<String>>, CsvError> {
        let mut values = Vec::with_capacity(self.field_count());
        for i in 0..self.field_count() {
            if self.is_null(i)? {
                values.push(None);
            } else {
                values.push(self.reader.field(i)?.into_owned());
            }
        }
        Ok(values)
    }

    /// Whether field `i` is absent or one of the configured null values
    pub fn is_null(&mut self, i: usize) -> Result<bool, CsvError> {
        let value = self.reader.field(i)?;
        Ok(match value.as_str() {
            Some(text) => self.null_values.iter().any(|null| null == text),
            None => true,
        })
    }

    /// The wrapped reader
    pub fn reader(&self) -> &RecordReader<S> {
        &self.reader
    }

    pub fn into_inner(self) -> RecordReader<S> {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CsvConfig, CsvConfigBuilder, HeaderComparison};
    use crate::io::CsvParser;
    use crate::types::Recovery;
    use std::io::Cursor;

    fn data_reader(builder: CsvConfigBuilder, input: &'static str) -> DataReader<CsvParser<Cursor<&'static str>>> {
        let parser = CsvParser::new(Cursor::new(input), builder.build().unwrap());
        DataReader::new(RecordReader::new(parser)).unwrap()
    }

    #[test]
    fn test_header_row_is_consumed() {
        let mut reader = data_reader(CsvConfig::builder(","), "Id,Name\n1,one\n2,two\n");

        assert_eq!(reader.name(1), Some("Name"));
        assert!(reader.read().unwrap());
        assert_eq!(reader.field_count(), 2);
        assert_eq!(reader.get(1).unwrap().as_str(), Some("one"));
        assert!(reader.read().unwrap());
        assert_eq!(reader.get(0).unwrap().as_str(), Some("2"));
        assert!(!reader.read().unwrap());
    }

    #[test]
    fn test_without_header_first_row_is_kept() {
        let builder = CsvConfig::builder(",").has_header_record(false);
        let mut reader = data_reader(builder, "1,one\n2,two\n");

        assert_eq!(reader.name(0), None);
        assert!(reader.read().unwrap());
        assert_eq!(reader.get(0).unwrap().as_str(), Some("1"));
        assert!(reader.read().unwrap());
        assert_eq!(reader.get(0).unwrap().as_str(), Some("2"));
        assert!(!reader.read().unwrap());
    }

    #[test]
    fn test_empty_input() {
        let mut reader = data_reader(CsvConfig::builder(","), "");
        assert!(!reader.read().unwrap());
        assert_eq!(reader.field_count(), 0);
    }

    #[test]
    fn test_ordinal_falls_back_to_case_insensitive_match() {
        let mut reader = data_reader(CsvConfig::builder(","), "Id,Name\n1,one\n");
        reader.read().unwrap();

        assert_eq!(reader.ordinal("Name").unwrap(), 1);
        assert_eq!(reader.ordinal("NAME").unwrap(), 1);
        assert_eq!(reader.ordinal("id").unwrap(), 0);
    }

    #[test]
    fn test_ordinal_ordinal_comparison() {
        let builder = CsvConfig::builder(",").header_comparison(HeaderComparison::Ordinal);
        let mut reader = data_reader(builder, "Id,Name\n1,one\n");
        reader.read().unwrap();

        let error = reader.ordinal("NAME").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Missing field at row 2: Field with name 'NAME' and prepared name 'NAME' was not found."
        );
    }

    #[test]
    fn test_values_and_nulls() {
        let builder = CsvConfig::builder(",").missing_field_found(|_| Recovery::Continue);
        let mut reader =
            data_reader(builder, "a,b,c\n1,NULL,\n").with_null_values(["NULL", ""]);
        reader.read().unwrap();

        assert_eq!(
            reader.values().unwrap(),
            vec![Some("1".to_string()), None, None]
        );
        assert!(!reader.is_null(0).unwrap());
        assert!(reader.is_null(1).unwrap());
        assert!(reader.is_null(7).unwrap());
    }
}
