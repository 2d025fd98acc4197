//! Record reader
//!
//! Wraps a record source and adds header capture, field lookup by index or name,
//! the skip-record predicate and column count change detection.
//!
//! # State
//!
//! ```text
//! Unstarted ──read──▶ Positioned ──read (no more records)──▶ Exhausted
//!                        │   ▲
//!                        └───┘ read / read_header
//! ```
//!
//! Field access needs at least one read. Name lookups also need a captured header.
//!
//! # Error Handling
//!
//! Misuse (reading fields before `read`, names without a header) is always a
//! [`CsvError::Usage`]. A field that cannot be found goes through the
//! missing-field strategy; a changed column count goes through the
//! reading-exception strategy.

use crate::config::CsvConfig;
use crate::core::header::HeaderIndex;
use crate::core::traits::{RecordSource, RecordView};
use crate::io::AsyncCsvParser;
use crate::types::{
    CsvError, FieldValue, MissingFieldArgs, ReadingExceptionArgs, Record, Recovery,
    ShouldSkipRecordArgs,
};
use futures::io::AsyncRead;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Unstarted,
    Positioned,
    Exhausted,
}

/// Field-indexing reader over a record source
#[derive(Debug)]
pub struct RecordReader<S> {
    source: S,
    state: ReadState,
    header: Option<HeaderIndex>,
    column_count: usize,
    current_index: Option<usize>,
}

impl<S: RecordSource> RecordReader<S> {
    /// Advance to the next record the skip predicate lets through
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - positioned on a record
    /// * `Ok(false)` - the source is exhausted
    /// * `Err(CsvError)` - tokenizing failed, or the column count changed and
    ///   the reading-exception strategy chose to fail
    pub fn read(&mut self) -> Result<bool, CsvError> {
        let has_more = loop {
            if self.source.advance()?.is_none() {
                break false;
            }
            if !self.should_skip() {
                break true;
            }
        };
        self.finish_read(has_more)
    }
}

impl<R: AsyncRead + Unpin> RecordReader<AsyncCsvParser<R>> {
    /// Async counterpart of [`RecordReader::read`]
    pub async fn read_async(&mut self) -> Result<bool, CsvError> {
        let has_more = loop {
            if self.source.advance().await?.is_none() {
                break false;
            }
            if !self.should_skip() {
                break true;
            }
        };
        self.finish_read(has_more)
    }
}

impl<S: RecordView> RecordReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: ReadState::Unstarted,
            header: None,
            column_count: 0,
            current_index: None,
        }
    }

    fn should_skip(&self) -> bool {
        let args = ShouldSkipRecordArgs {
            record: self.source.record(),
            row: self.source.row(),
        };
        let skip = self.source.config().should_skip(&args);
        if skip {
            debug!(row = self.source.row(), "skipped record");
        }
        skip
    }

    fn finish_read(&mut self, has_more: bool) -> Result<bool, CsvError> {
        self.current_index = None;
        if !has_more {
            self.state = ReadState::Exhausted;
            return Ok(false);
        }
        self.state = ReadState::Positioned;

        let count = self.source.record().len();
        let config = self.source.config();
        if config.detect_column_count_changes() && self.column_count > 0 && count != self.column_count
        {
            let row = self.source.row();
            let error = CsvError::column_count_change(row, self.column_count, count);
            let args = ReadingExceptionArgs { error: &error, row };
            if config.on_reading_exception(&args) == Recovery::Fail {
                return Err(error);
            }
            warn!(
                row,
                expected = self.column_count,
                actual = count,
                "column count changed; continuing"
            );
        }
        self.column_count = count;

        Ok(true)
    }

    /// Capture the current record as the header
    ///
    /// Does not advance. Replaces any previous header and clears every cached
    /// name lookup.
    pub fn read_header(&mut self) -> Result<bool, CsvError> {
        if !self.source.config().has_header_record() {
            return Err(CsvError::usage("Configuration has_header_record is false."));
        }
        match self.state {
            ReadState::Unstarted => {
                return Err(CsvError::usage(
                    "You must call read on the reader before reading the header.",
                ))
            }
            ReadState::Exhausted => return Err(CsvError::usage("No header record was found.")),
            ReadState::Positioned => {}
        }

        let index = HeaderIndex::new(self.source.record(), self.source.config());
        debug!(
            row = self.source.row(),
            columns = index.header().len(),
            "captured header"
        );
        self.header = Some(index);
        Ok(true)
    }

    /// The current record
    pub fn record(&self) -> Result<&Record, CsvError> {
        self.check_has_been_read()?;
        Ok(self.source.record())
    }

    /// Field at `index` of the current record
    pub fn field(&mut self, index: usize) -> Result<FieldValue<'_>, CsvError> {
        self.check_has_been_read()?;
        self.current_index = Some(index);

        match self.source.record().get(index) {
            Some(value) => Ok(FieldValue::Value(value)),
            None => self.missing_field(&[], index),
        }
    }

    /// Field under the first column named `name`
    pub fn field_by_name(&mut self, name: &str) -> Result<FieldValue<'_>, CsvError> {
        self.field_by_names(&[name], 0)
    }

    /// Field under the `occurrence`-th column named `name`
    pub fn field_by_name_at(
        &mut self,
        name: &str,
        occurrence: usize,
    ) -> Result<FieldValue<'_>, CsvError> {
        self.field_by_names(&[name], occurrence)
    }

    /// Field under the first of several alternative names found in the header
    pub fn field_by_names(
        &mut self,
        names: &[&str],
        occurrence: usize,
    ) -> Result<FieldValue<'_>, CsvError> {
        self.check_has_been_read()?;
        match self.resolve(names, occurrence)? {
            Some(index) => self.field(index),
            None => self.missing_field(names, occurrence),
        }
    }

    /// Column index for a name, invoking the missing-field strategy when absent
    ///
    /// # Returns
    ///
    /// * `Ok(Some(index))` - the column of the requested occurrence
    /// * `Ok(None)` - not found and the strategy chose to continue
    /// * `Err(CsvError)` - usage error, or not found and the strategy failed
    pub fn field_index(
        &mut self,
        names: &[&str],
        occurrence: usize,
    ) -> Result<Option<usize>, CsvError> {
        let index = self.resolve(names, occurrence)?;
        if index.is_none() {
            self.missing_field(names, occurrence)?;
        }
        Ok(index)
    }

    /// Column index for a name, without invoking any strategy
    pub fn try_field_index(
        &mut self,
        names: &[&str],
        occurrence: usize,
    ) -> Result<Option<usize>, CsvError> {
        self.resolve(names, occurrence)
    }

    /// The captured header, if any
    pub fn header(&self) -> Option<&Record> {
        self.header.as_ref().map(HeaderIndex::header)
    }

    /// Width of the last record read, 0 before the first read
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Field index last requested on the current record
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// 1-based physical row of the current record
    pub fn row(&self) -> u64 {
        self.source.row()
    }

    pub fn config(&self) -> &CsvConfig {
        self.source.config()
    }

    /// The wrapped source
    pub fn parser(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    fn check_has_been_read(&self) -> Result<(), CsvError> {
        if self.state == ReadState::Unstarted {
            return Err(CsvError::usage(
                "You must call read on the reader before accessing its data.",
            ));
        }
        Ok(())
    }

    fn resolve(&mut self, names: &[&str], occurrence: usize) -> Result<Option<usize>, CsvError> {
        let config = self.source.config();
        if !config.has_header_record() {
            return Err(CsvError::usage(
                "There is no header record to determine the index by name.",
            ));
        }
        let header = self.header.as_mut().ok_or_else(|| {
            CsvError::usage(
                "The header has not been read. You must call read_header before any fields can be retrieved by name.",
            )
        })?;
        Ok(header.resolve(names, occurrence, config))
    }

    fn missing_field(
        &self,
        names: &[&str],
        index: usize,
    ) -> Result<FieldValue<'static>, CsvError> {
        let row = self.source.row();
        let args = MissingFieldArgs { names, index, row };

        match self.source.config().on_missing_field(&args) {
            Recovery::Fail if names.is_empty() => Err(CsvError::missing_index(row, index)),
            Recovery::Fail => Err(CsvError::missing_names(row, names, index)),
            Recovery::Continue => {
                warn!(row, index, ?names, "missing field; continuing without a value");
                Ok(FieldValue::Missing)
            }
            Recovery::Substitute(value) => {
                warn!(row, index, ?names, "missing field; using a placeholder");
                Ok(FieldValue::Placeholder(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CsvConfigBuilder;
    use crate::io::CsvParser;
    use rstest::rstest;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// In-memory source yielding fixed records on consecutive rows
    struct SourceMock {
        records: Vec<Record>,
        position: usize,
        current: Record,
        config: CsvConfig,
    }

    impl SourceMock {
        fn new(builder: CsvConfigBuilder, rows: &[&[&str]]) -> Self {
            Self {
                records: rows.iter().map(|row| row.iter().collect()).collect(),
                position: 0,
                current: Record::new(),
                config: builder.build().unwrap(),
            }
        }
    }

    impl RecordView for SourceMock {
        fn record(&self) -> &Record {
            &self.current
        }

        fn row(&self) -> u64 {
            self.position as u64
        }

        fn config(&self) -> &CsvConfig {
            &self.config
        }
    }

    impl RecordSource for SourceMock {
        fn advance(&mut self) -> Result<Option<&Record>, CsvError> {
            match self.records.get(self.position) {
                Some(record) => {
                    self.current = record.clone();
                    self.position += 1;
                    Ok(Some(&self.current))
                }
                None => {
                    self.current.clear();
                    Ok(None)
                }
            }
        }
    }

    fn reader(builder: CsvConfigBuilder, rows: &[&[&str]]) -> RecordReader<SourceMock> {
        RecordReader::new(SourceMock::new(builder, rows))
    }

    fn value(result: Result<FieldValue<'_>, CsvError>) -> Option<String> {
        result.unwrap().into_owned()
    }

    #[test]
    fn test_read_header_then_fields_by_name() {
        let mut reader = reader(
            CsvConfig::builder(","),
            &[&["One", "Two"], &["1", "2"], &["3", "4"]],
        );

        assert!(reader.read().unwrap());
        assert!(reader.read_header().unwrap());
        assert_eq!(reader.header().unwrap().to_vec(), vec!["One", "Two"]);

        assert!(reader.read().unwrap());
        assert_eq!(value(reader.field_by_name("Two")), Some("2".to_string()));
        assert_eq!(value(reader.field(0)), Some("1".to_string()));

        assert!(reader.read().unwrap());
        assert_eq!(value(reader.field_by_name("One")), Some("3".to_string()));
        assert!(!reader.read().unwrap());
    }

    #[test]
    fn test_duplicate_header_resolves_by_occurrence() {
        let mut reader = reader(
            CsvConfig::builder(","),
            &[&["Field1", "Field1"], &["a", "b"]],
        );
        reader.read().unwrap();
        reader.read_header().unwrap();
        reader.read().unwrap();

        assert_eq!(reader.try_field_index(&["Field1"], 0).unwrap(), Some(0));
        assert_eq!(reader.try_field_index(&["Field1"], 1).unwrap(), Some(1));
        assert_eq!(value(reader.field_by_name_at("Field1", 1)), Some("b".to_string()));
        assert_eq!(reader.current_index(), Some(1));
    }

    #[test]
    fn test_field_before_read_is_usage_error() {
        let mut reader = reader(CsvConfig::builder(","), &[&["a"]]);
        let error = reader.field(0).unwrap_err();
        assert!(matches!(error, CsvError::Usage { .. }));
        assert!(error.to_string().contains("You must call read"));
    }

    #[rstest]
    #[case::before_read(false, true)]
    #[case::headers_disabled(true, false)]
    fn test_read_header_usage_errors(#[case] read_first: bool, #[case] has_header: bool) {
        let mut reader = reader(
            CsvConfig::builder(",").has_header_record(has_header),
            &[&["a"]],
        );
        if read_first {
            reader.read().unwrap();
        }
        assert!(matches!(reader.read_header(), Err(CsvError::Usage { .. })));
    }

    #[test]
    fn test_read_header_after_end_is_usage_error() {
        let mut reader = reader(CsvConfig::builder(","), &[]);
        assert!(!reader.read().unwrap());
        let error = reader.read_header().unwrap_err();
        assert_eq!(error.to_string(), "Usage error: No header record was found.");
    }

    #[test]
    fn test_name_lookup_without_header() {
        let mut reader = reader(CsvConfig::builder(","), &[&["a"]]);
        reader.read().unwrap();
        let error = reader.field_by_name("a").unwrap_err();
        assert!(error.to_string().contains("The header has not been read"));

        let mut reader = reader_without_header();
        reader.read().unwrap();
        let error = reader.field_index(&["a"], 0).unwrap_err();
        assert!(error.to_string().contains("There is no header record"));
    }

    fn reader_without_header() -> RecordReader<SourceMock> {
        reader(CsvConfig::builder(",").has_header_record(false), &[&["a"]])
    }

    #[test]
    fn test_missing_field_fails_by_default() {
        let mut reader = reader(CsvConfig::builder(","), &[&["Id"], &["1"]]);
        reader.read().unwrap();
        reader.read_header().unwrap();
        reader.read().unwrap();

        match reader.field(3).unwrap_err() {
            CsvError::MissingField {
                row, index, names, ..
            } => {
                assert_eq!(row, 2);
                assert_eq!(index, 3);
                assert!(names.is_empty());
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }

        let error = reader.field_by_names(&["Name", "Title"], 0).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Missing field at row 2: Field containing names 'Name' or 'Title' does not exist."
        );
    }

    #[test]
    fn test_missing_field_continue_returns_missing() {
        let mut reader = reader(
            CsvConfig::builder(",").missing_field_found(|_| Recovery::Continue),
            &[&["Id"], &["1"]],
        );
        reader.read().unwrap();
        reader.read_header().unwrap();
        reader.read().unwrap();

        assert_eq!(reader.field(5).unwrap(), FieldValue::Missing);
        assert_eq!(reader.field_by_name("Name").unwrap(), FieldValue::Missing);
        assert_eq!(reader.field_index(&["Name"], 0).unwrap(), None);
    }

    #[test]
    fn test_missing_field_substitute_and_context() {
        let seen: Arc<Mutex<Vec<(Vec<String>, usize, u64)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let builder = CsvConfig::builder(",").missing_field_found(move |args| {
            sink.lock().unwrap().push((
                args.names.iter().map(|n| n.to_string()).collect(),
                args.index,
                args.row,
            ));
            Recovery::Substitute("n/a".to_string())
        });
        let mut reader = reader(builder, &[&["Id", "Id"], &["1", "2"]]);
        reader.read().unwrap();
        reader.read_header().unwrap();
        reader.read().unwrap();

        assert_eq!(
            reader.field_by_name_at("Id", 2).unwrap(),
            FieldValue::Placeholder("n/a".to_string())
        );
        assert_eq!(reader.try_field_index(&["Nope"], 0).unwrap(), None);
        assert_eq!(*seen.lock().unwrap(), vec![(vec!["Id".to_string()], 2, 2)]);
    }

    #[test]
    fn test_short_record_is_missing_by_name() {
        let mut reader = reader(
            CsvConfig::builder(",").missing_field_found(|_| Recovery::Continue),
            &[&["a", "b"], &["1"]],
        );
        reader.read().unwrap();
        reader.read_header().unwrap();
        reader.read().unwrap();
        assert!(reader.field_by_name("b").unwrap().is_missing());
    }

    #[rstest]
    #[case::detection_enabled(true)]
    #[case::detection_disabled(false)]
    fn test_column_count_change(#[case] detect: bool) {
        let mut reader = reader(
            CsvConfig::builder(",").detect_column_count_changes(detect),
            &[&["1", "2"], &["1", "2", "3"]],
        );
        assert!(reader.read().unwrap());
        assert_eq!(reader.column_count(), 2);

        let result = reader.read();
        if detect {
            assert_eq!(
                result.unwrap_err(),
                CsvError::ColumnCountChange {
                    row: 2,
                    expected: 2,
                    actual: 3
                }
            );
        } else {
            assert!(result.unwrap());
            assert_eq!(reader.column_count(), 3);
        }
    }

    #[test]
    fn test_column_count_change_tolerated_by_strategy() {
        let mut reader = reader(
            CsvConfig::builder(",")
                .detect_column_count_changes(true)
                .reading_exception_occurred(|_| Recovery::Continue),
            &[&["1", "2"], &["1", "2", "3"], &["1"]],
        );
        assert!(reader.read().unwrap());
        assert!(reader.read().unwrap());
        assert_eq!(reader.column_count(), 3);
        assert!(reader.read().unwrap());
        assert_eq!(reader.column_count(), 1);
    }

    #[test]
    fn test_skip_predicate_hides_records_and_keeps_physical_rows() {
        let builder = CsvConfig::builder(",")
            .should_skip_record(|args| args.record.get(0).is_some_and(|f| f.starts_with("skip")));
        let mut reader = reader(
            builder,
            &[&["keep1"], &["skip1"], &["skip2"], &["keep2"], &["skip3"]],
        );

        assert!(reader.read().unwrap());
        assert_eq!(value(reader.field(0)), Some("keep1".to_string()));
        assert_eq!(reader.row(), 1);

        assert!(reader.read().unwrap());
        assert_eq!(value(reader.field(0)), Some("keep2".to_string()));
        assert_eq!(reader.row(), 4);

        assert!(!reader.read().unwrap());
    }

    #[test]
    fn test_read_resets_current_index() {
        let mut reader = reader(CsvConfig::builder(","), &[&["a", "b"], &["c", "d"]]);
        reader.read().unwrap();
        reader.field(1).unwrap();
        assert_eq!(reader.current_index(), Some(1));
        reader.read().unwrap();
        assert_eq!(reader.current_index(), None);
    }

    #[test]
    fn test_header_recapture_replaces_index() {
        let mut reader = reader(
            CsvConfig::builder(","),
            &[&["a", "b"], &["b", "a"], &["1", "2"]],
        );
        reader.read().unwrap();
        reader.read_header().unwrap();
        assert_eq!(reader.try_field_index(&["a"], 0).unwrap(), Some(0));

        reader.read().unwrap();
        reader.read_header().unwrap();
        assert_eq!(reader.try_field_index(&["a"], 0).unwrap(), Some(1));

        reader.read().unwrap();
        assert_eq!(value(reader.field_by_name("a")), Some("2".to_string()));
    }

    #[test]
    fn test_prepare_header_for_match_applies_to_lookups() {
        let builder =
            CsvConfig::builder(",").prepare_header_for_match(|args| args.header.trim().to_lowercase());
        let mut reader = reader(builder, &[&[" Name ", "AGE"], &["x", "7"]]);
        reader.read().unwrap();
        reader.read_header().unwrap();
        reader.read().unwrap();

        assert_eq!(value(reader.field_by_name("name")), Some("x".to_string()));
        assert_eq!(value(reader.field_by_name("Age")), Some("7".to_string()));
    }

    #[test]
    fn test_reader_over_parser() {
        let config = CsvConfig::builder(";").build().unwrap();
        let parser = CsvParser::new(Cursor::new("id;name\r\n1;\"a;b\"\r\n"), config);
        let mut reader = RecordReader::new(parser);

        reader.read().unwrap();
        reader.read_header().unwrap();
        reader.read().unwrap();
        assert_eq!(value(reader.field_by_name("name")), Some("a;b".to_string()));
        assert_eq!(reader.row(), 2);
        assert_eq!(reader.parser().raw_record(), "1;\"a;b\"\r\n");
    }

    #[tokio::test]
    async fn test_read_async() {
        let config = CsvConfig::builder(",")
            .should_skip_record(|args| args.record.get(0) == Some("x"))
            .build()
            .unwrap();
        let parser = AsyncCsvParser::new(futures::io::Cursor::new(&b"h\nx\ny\n"[..]), config);
        let mut reader = RecordReader::new(parser);

        assert!(reader.read_async().await.unwrap());
        reader.read_header().unwrap();
        assert!(reader.read_async().await.unwrap());
        assert_eq!(value(reader.field_by_name("h")), Some("y".to_string()));
        assert_eq!(reader.row(), 3);
        assert!(!reader.read_async().await.unwrap());
    }
}
