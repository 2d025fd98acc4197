//! Record formatting for the writers
//!
//! Decides when a field needs quoting, escapes it, and accumulates the output of
//! the current record in a buffer that grows by doubling. The blocking and async
//! writers only differ in how they hand the buffer to their sink.
//!
//! # Quoting
//!
//! A non-empty field is quoted when it contains the quote character, starts or
//! ends with a space, contains the delimiter, or contains a newline. The newline
//! test uses the pinned newline when one is configured, otherwise any CR or LF.
//! Fields whose end would combine with a following multi-character delimiter
//! (or pinned newline) into an early match are quoted as well.
//! Inside quotes the quote character (and a distinct escape character) is
//! prefixed with the escape character.

use crate::config::{defaults, CsvConfig};

#[derive(Debug)]
pub struct RecordFormatter {
    config: CsvConfig,
    buffer: String,
    capacity: usize,
    first_field_empty: bool,
    index: usize,
    row: u64,
    header: Option<Vec<String>>,
}

impl RecordFormatter {
    pub fn new(config: CsvConfig) -> Self {
        let capacity = config.buffer_size();
        Self {
            config,
            buffer: String::with_capacity(capacity),
            capacity,
            first_field_empty: false,
            index: 0,
            row: 1,
            header: None,
        }
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// 1-based row being written
    pub fn row(&self) -> u64 {
        self.row
    }

    /// Number of fields written to the current record
    pub fn index(&self) -> usize {
        self.index
    }

    /// Names passed to the last [`write_header`](Self::write_header)
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Capacity the buffer has grown to
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether a field would be quoted by [`write_field`](Self::write_field)
    pub fn should_quote(&self, field: &str) -> bool {
        if field.is_empty() {
            return false;
        }

        let has_new_line = match self.config.new_line() {
            Some(new_line) => field.contains(new_line),
            None => field.contains(defaults::LINE_ENDING_CHARS),
        };
        // A leading comment character would turn the record into a comment line
        let reads_as_comment = self.config.allow_comments()
            && self.index == 0
            && field.starts_with(self.config.comment());

        field.contains(self.config.quote())
            || field.starts_with(' ')
            || field.ends_with(' ')
            || field.contains(self.config.delimiter())
            || has_new_line
            || reads_as_comment
            || completes_early(field, self.config.delimiter())
            || self
                .config
                .new_line()
                .is_some_and(|new_line| completes_early(field, new_line))
    }

    /// Append a field, trimming and quoting it as configured
    pub fn write_field(&mut self, field: &str) {
        let field = if self.config.trim_options().trim {
            field.trim_matches(defaults::WHITESPACE)
        } else {
            field
        };
        let quote = self.should_quote(field);
        self.write_field_quoting(field, quote);
    }

    /// Append a field, quoting it only when `quote` is set
    pub fn write_field_quoting(&mut self, field: &str, quote: bool) {
        if self.index == 0 {
            self.first_field_empty = field.is_empty() && !quote;
        }
        self.write_delimiter();

        if quote {
            let quote = self.config.quote();
            let escape = self.config.escape();
            self.reserve(field.len() + 2);
            self.buffer.push(quote);
            for c in field.chars() {
                if c == quote || c == escape {
                    self.push_char(escape);
                }
                self.push_char(c);
            }
            self.push_char(quote);
        } else {
            self.push_str(field);
        }

        self.index += 1;
    }

    /// Append every name as a field and remember them as the header
    pub fn write_header<I, T>(&mut self, names: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut header = Vec::new();
        for name in names {
            self.write_field(name.as_ref());
            header.push(name.as_ref().to_string());
        }
        self.header = Some(header);
    }

    /// Append a comment field: the comment character followed by `text`, unquoted
    pub fn write_comment(&mut self, text: &str) {
        if self.index == 0 {
            self.first_field_empty = false;
        }
        self.write_delimiter();
        let comment = self.config.comment();
        self.push_char(comment);
        self.push_str(text);
        self.index += 1;
    }

    /// Terminate the current record
    ///
    /// A record made of one empty field is written as `""` so it is not read
    /// back as a blank line.
    pub fn end_record(&mut self) {
        if self.index == 1 && self.first_field_empty {
            let quote = self.config.quote();
            self.push_char(quote);
            self.push_char(quote);
        }

        let new_line = self.config.write_new_line().to_string();
        self.push_str(&new_line);
        self.index = 0;
        self.row += 1;
    }

    /// Text waiting to be written to the sink
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Forget the pending text once the sink accepted it
    pub fn clear_pending(&mut self) {
        self.buffer.clear();
    }

    fn write_delimiter(&mut self) {
        if self.index > 0 {
            let delimiter = self.config.delimiter().to_string();
            self.push_str(&delimiter);
        }
    }

    fn push_str(&mut self, text: &str) {
        self.reserve(text.len());
        self.buffer.push_str(text);
    }

    fn push_char(&mut self, c: char) {
        self.reserve(c.len_utf8());
        self.buffer.push(c);
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.buffer.len() + additional;
        if needed > self.capacity {
            while needed > self.capacity {
                self.capacity *= 2;
            }
            self.buffer.reserve_exact(self.capacity - self.buffer.len());
        }
    }
}

/// Whether the end of `field` followed by `token` contains `token` before the
/// field ends, as in `a|` followed by `||`
fn completes_early(field: &str, token: &str) -> bool {
    let keep = token.len().saturating_sub(1);
    if keep == 0 {
        return false;
    }

    let mut start = field.len().saturating_sub(keep);
    while !field.is_char_boundary(start) {
        start += 1;
    }
    let tail = &field[start..];
    let joined = format!("{}{}", tail, token);
    joined.find(token).is_some_and(|position| position < tail.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CsvConfigBuilder, TrimOptions};
    use rstest::rstest;

    fn formatter(builder: CsvConfigBuilder) -> RecordFormatter {
        RecordFormatter::new(builder.build().unwrap())
    }

    #[rstest]
    #[case::plain("abc", false)]
    #[case::empty("", false)]
    #[case::quote("a\"b", true)]
    #[case::leading_space(" a", true)]
    #[case::trailing_space("a ", true)]
    #[case::inner_space("a b", false)]
    #[case::delimiter("a;b", true)]
    #[case::lf("a\nb", true)]
    #[case::cr("a\rb", true)]
    #[case::tab("a\tb", false)]
    fn test_should_quote(#[case] field: &str, #[case] expected: bool) {
        let formatter = formatter(CsvConfig::builder(";"));
        assert_eq!(formatter.should_quote(field), expected);
    }

    #[test]
    fn test_pinned_new_line_only_quotes_that_sequence() {
        let formatter = formatter(CsvConfig::builder(",").new_line("\r\n"));
        assert!(!formatter.should_quote("a\nb"));
        assert!(formatter.should_quote("a\r\nb"));
    }

    #[test]
    fn test_multi_character_delimiter_quoting() {
        let formatter = formatter(CsvConfig::builder("||"));
        assert!(!formatter.should_quote("a|b"));
        assert!(!formatter.should_quote("|a"));
        assert!(formatter.should_quote("a||b"));
        assert!(formatter.should_quote("a|"));
    }

    #[test]
    fn test_record_output() {
        let mut formatter = formatter(CsvConfig::builder(","));
        formatter.write_field("a");
        formatter.write_field("b,c");
        formatter.write_field("say \"hi\"");
        formatter.write_field("");
        formatter.end_record();

        assert_eq!(formatter.pending(), "a,\"b,c\",\"say \"\"hi\"\"\",\r\n");
        assert_eq!(formatter.row(), 2);
        assert_eq!(formatter.index(), 0);
    }

    #[test]
    fn test_distinct_escape_escapes_itself() {
        let mut formatter = formatter(CsvConfig::builder(",").escape('\\'));
        formatter.write_field("a\"b\\c");
        formatter.end_record();
        assert_eq!(formatter.pending(), "\"a\\\"b\\\\c\"\r\n");
    }

    #[test]
    fn test_forced_quoting_and_comment() {
        let mut formatter = formatter(CsvConfig::builder(",").new_line("\n"));
        formatter.write_comment("note");
        formatter.end_record();
        formatter.write_field_quoting("x", true);
        formatter.write_field_quoting("a\"b", false);
        formatter.end_record();
        assert_eq!(formatter.pending(), "#note\n\"x\",a\"b\n");
    }

    #[test]
    fn test_trim_before_quoting_decision() {
        let mut formatter = formatter(CsvConfig::builder(",").trim_options(TrimOptions::TRIM));
        formatter.write_field("  padded  ");
        formatter.end_record();
        assert_eq!(formatter.pending(), "padded\r\n");
    }

    #[test]
    fn test_single_empty_field_is_quoted() {
        let mut formatter = formatter(CsvConfig::builder(","));
        formatter.write_field("");
        formatter.end_record();
        formatter.end_record();
        assert_eq!(formatter.pending(), "\"\"\r\n\r\n");
    }

    #[test]
    fn test_leading_comment_character_is_quoted_when_comments_are_read() {
        let formatter_without = formatter(CsvConfig::builder(","));
        assert!(!formatter_without.should_quote("#x"));

        let mut formatter = formatter(CsvConfig::builder(",").allow_comments(true));
        assert!(formatter.should_quote("#x"));
        formatter.write_field("a");
        assert!(!formatter.should_quote("#x"));
    }

    #[test]
    fn test_buffer_capacity_doubles() {
        let mut formatter = formatter(CsvConfig::builder(",").buffer_size(4));
        formatter.write_field("abcdefghij");
        assert_eq!(formatter.capacity(), 16);
        assert_eq!(formatter.pending(), "abcdefghij");

        formatter.clear_pending();
        formatter.write_field("x");
        assert_eq!(formatter.capacity(), 16);
    }

    #[test]
    fn test_write_header_records_names() {
        let mut formatter = formatter(CsvConfig::builder(","));
        formatter.write_header(["id", "name"]);
        assert_eq!(
            formatter.header(),
            Some(&["id".to_string(), "name".to_string()][..])
        );
        assert_eq!(formatter.pending(), "id,name");
    }
}
