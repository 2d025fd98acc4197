//! CSV tokenizer state machine
//!
//! The tokenizer is fed one character at a time and never looks ahead: every
//! decision that needs the next character (a doubled quote, a CRLF pair, a
//! multi-character delimiter) is carried in the state between calls. Because of
//! that, where the driver's block buffer happens to end has no effect on the
//! result.
//!
//! # States
//!
//! ```text
//! FieldStart ──quote──▶ Quoted ──quote──▶ QuoteInQuoted ──quote──▶ Quoted
//!     │                   │                    └──other──▶ AfterQuoted
//!     │                   └──escape──▶ EscapeInQuoted ──any──▶ Quoted
//!     ├──comment (line start)──▶ Comment ──newline──▶ FieldStart
//!     └──other──▶ Unquoted
//! ```
//!
//! Outside quotes, characters that could begin the delimiter or a newline are
//! collected in a pending buffer until they either complete the token or stop
//! matching, in which case the first pending character is taken literally and
//! the rest are fed again.

use crate::config::{defaults, CsvConfig};
use crate::types::{BadDataArgs, CsvError, Record, Recovery};
use std::collections::VecDeque;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
    EscapeInQuoted,
    AfterQuoted,
    Comment,
}

/// Incremental CSV tokenizer
#[derive(Debug)]
pub struct Tokenizer {
    config: CsvConfig,
    state: State,
    field: String,
    quoted: bool,
    field_reported: bool,
    replacement: Option<String>,
    record: Record,
    record_complete: bool,
    raw_record: String,
    raw_tail: String,
    line_done: bool,
    pending: String,
    replay: VecDeque<char>,
    at_eof: bool,
    row: u64,
}

impl Tokenizer {
    /// Create a tokenizer for the given configuration
    pub fn new(config: CsvConfig) -> Self {
        Self {
            config,
            state: State::FieldStart,
            field: String::new(),
            quoted: false,
            field_reported: false,
            replacement: None,
            record: Record::new(),
            record_complete: false,
            raw_record: String::new(),
            raw_tail: String::new(),
            line_done: false,
            pending: String::new(),
            replay: VecDeque::new(),
            at_eof: false,
            row: 0,
        }
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// The record completed by the last successful call
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Raw text of the current (or last completed) record
    pub fn raw_record(&self) -> &str {
        &self.raw_record
    }

    /// 1-based row of the last completed line, 0 before any line
    pub fn row(&self) -> u64 {
        self.row
    }

    /// Drop the fields of the previous record before tokenizing the next one
    ///
    /// Fields of a record that is still in progress (the last call failed or was
    /// abandoned partway through it) are kept, so tokenizing resumes where it stopped.
    pub fn begin_record(&mut self) {
        if self.record_complete {
            self.record_complete = false;
            self.record.clear();
        }
    }

    /// Feed one character; returns true when it completed a record
    pub fn feed(&mut self, c: char) -> Result<bool, CsvError> {
        debug_assert!(self.replay.is_empty(), "drain must run before feed");

        self.start_line();
        self.raw_record.push(c);

        if self.step(c)? {
            return Ok(true);
        }
        self.drain()
    }

    /// Process characters queued for another pass; returns true when they
    /// completed a record
    pub fn drain(&mut self) -> Result<bool, CsvError> {
        while let Some(c) = self.replay.pop_front() {
            self.start_line();
            if self.step(c)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Signal the end of input; returns true when a final record was completed
    ///
    /// Safe to call repeatedly: once everything is flushed it keeps returning false.
    pub fn finish(&mut self) -> Result<bool, CsvError> {
        self.at_eof = true;

        if !self.pending.is_empty() {
            if self.state == State::Comment {
                self.pending.clear();
            } else {
                self.requeue_pending(0);
            }
        }
        if self.drain()? {
            return Ok(true);
        }

        match self.state {
            State::Comment => {
                self.row += 1;
                self.line_done = true;
                self.state = State::FieldStart;
                debug!(row = self.row, "discarded comment line at end of input");
                return Ok(false);
            }
            State::FieldStart if self.field.is_empty() && self.record.is_empty() => {
                return Ok(false);
            }
            State::Quoted | State::EscapeInQuoted => {
                self.report_bad_data(None, "Unterminated quoted field at end of input")?;
            }
            _ => {}
        }

        self.row += 1;
        self.line_done = true;
        self.end_field();
        self.record_complete = true;
        Ok(true)
    }

    /// Begin the raw text of a new line once the previous one has ended
    fn start_line(&mut self) {
        if self.line_done {
            self.line_done = false;
            std::mem::swap(&mut self.raw_record, &mut self.raw_tail);
            self.raw_tail.clear();
        }
    }

    fn step(&mut self, c: char) -> Result<bool, CsvError> {
        match self.state {
            State::Comment => self.step_comment(c),
            State::Quoted => {
                self.step_quoted(c);
                Ok(false)
            }
            State::EscapeInQuoted => {
                self.field.push(c);
                self.state = State::Quoted;
                Ok(false)
            }
            State::QuoteInQuoted => {
                if c == self.config.quote() {
                    self.field.push(c);
                    self.state = State::Quoted;
                    Ok(false)
                } else {
                    self.state = State::AfterQuoted;
                    self.step_outside(c)
                }
            }
            State::FieldStart | State::Unquoted | State::AfterQuoted => self.step_outside(c),
        }
    }

    fn step_quoted(&mut self, c: char) {
        let quote = self.config.quote();
        let escape = self.config.escape();

        if escape != quote && c == escape {
            self.state = State::EscapeInQuoted;
        } else if c == quote {
            self.state = if escape == quote {
                State::QuoteInQuoted
            } else {
                State::AfterQuoted
            };
        } else {
            self.field.push(c);
        }
    }

    fn step_outside(&mut self, c: char) -> Result<bool, CsvError> {
        if self.pending.is_empty() && !self.starts_token(c) {
            self.step_literal(c)?;
            return Ok(false);
        }

        self.pending.push(c);

        if self.pending == self.config.delimiter() {
            self.pending.clear();
            self.end_field();
            return Ok(false);
        }

        match self.config.new_line() {
            Some(new_line) if self.pending == new_line => {
                self.pending.clear();
                return self.end_line();
            }
            None if self.pending == "\r" && !self.at_eof => {
                // CR or CRLF: decided by the next character
                return Ok(false);
            }
            None if matches!(self.pending.as_str(), "\r" | "\n" | "\r\n") => {
                self.pending.clear();
                return self.end_line();
            }
            None if self.pending.starts_with('\r') => {
                // Lone CR; the character after it starts the next line
                self.requeue_pending(1);
                return self.end_line();
            }
            _ => {}
        }

        if !self.at_eof && self.is_token_prefix() {
            return Ok(false);
        }

        // Not a delimiter or newline after all: the first character is data
        let first = self.requeue_pending(1);
        if let Some(first) = first {
            self.step_literal(first)?;
        }
        Ok(false)
    }

    fn step_literal(&mut self, c: char) -> Result<(), CsvError> {
        let trim = self.config.trim_options().trim;

        match self.state {
            State::FieldStart => {
                if c == self.config.quote() {
                    // Only whitespace can precede the quote here, and only when trimming
                    self.field.clear();
                    self.quoted = true;
                    self.state = State::Quoted;
                } else if self.config.allow_comments()
                    && c == self.config.comment()
                    && self.record.is_empty()
                {
                    self.field.clear();
                    self.state = State::Comment;
                } else {
                    self.field.push(c);
                    if !(trim && is_whitespace(c)) {
                        self.state = State::Unquoted;
                    }
                }
            }
            State::Unquoted => {
                if c == self.config.quote() {
                    self.report_bad_data(Some(c), "Quote found in unquoted field")?;
                } else {
                    self.field.push(c);
                }
            }
            State::AfterQuoted => {
                if !(trim && is_whitespace(c)) {
                    self.report_bad_data(Some(c), "Data found after closing quote")?;
                    self.state = State::Unquoted;
                }
            }
            State::Quoted | State::QuoteInQuoted | State::EscapeInQuoted | State::Comment => {
                self.field.push(c);
            }
        }
        Ok(())
    }

    fn step_comment(&mut self, c: char) -> Result<bool, CsvError> {
        let Some(new_line) = self.config.new_line() else {
            if self.pending.is_empty() {
                return match c {
                    '\r' => {
                        self.pending.push(c);
                        Ok(false)
                    }
                    '\n' => self.end_line(),
                    _ => Ok(false),
                };
            }
            self.pending.clear();
            if c != '\n' {
                self.replay.push_front(c);
            }
            return self.end_line();
        };

        if self.pending.is_empty() && !new_line.starts_with(c) {
            return Ok(false);
        }

        self.pending.push(c);
        if self.pending == new_line {
            self.pending.clear();
            return self.end_line();
        }
        if !new_line.starts_with(self.pending.as_str()) {
            // The first pending character was comment text; look at the rest again
            self.requeue_pending(1);
        }
        Ok(false)
    }

    fn starts_token(&self, c: char) -> bool {
        if self.config.delimiter().starts_with(c) {
            return true;
        }
        match self.config.new_line() {
            Some(new_line) => new_line.starts_with(c),
            None => defaults::LINE_ENDING_CHARS.contains(&c),
        }
    }

    fn is_token_prefix(&self) -> bool {
        let pending = self.pending.as_str();
        self.config.delimiter().starts_with(pending)
            || self
                .config
                .new_line()
                .is_some_and(|new_line| new_line.starts_with(pending))
    }

    /// Empty the pending buffer, queueing all but the first `keep` characters for
    /// another pass; returns the first character when `keep` is 1
    fn requeue_pending(&mut self, keep: usize) -> Option<char> {
        let mut pending = std::mem::take(&mut self.pending);
        let first = if keep > 0 {
            pending.chars().next()
        } else {
            None
        };
        let skip = first.map_or(0, char::len_utf8);
        for c in pending[skip..].chars().rev() {
            self.replay.push_front(c);
        }
        pending.clear();
        self.pending = pending;
        first
    }

    fn report_bad_data(&mut self, c: Option<char>, message: &str) -> Result<(), CsvError> {
        if !self.field_reported {
            self.field_reported = true;
            let args = BadDataArgs {
                row: self.row + 1,
                field_index: self.record.len(),
                field: &self.field,
                raw_record: &self.raw_record,
                message,
            };
            match self.config.on_bad_data(&args) {
                Recovery::Fail => return Err(self.bad_data_error(message)),
                Recovery::Continue => {
                    warn!(
                        row = self.row + 1,
                        field_index = self.record.len(),
                        "{}; keeping field as read",
                        message
                    );
                }
                Recovery::Substitute(value) => {
                    warn!(
                        row = self.row + 1,
                        field_index = self.record.len(),
                        "{}; field replaced",
                        message
                    );
                    self.replacement = Some(value);
                }
            }
        }

        if let Some(c) = c {
            self.field.push(c);
        }
        Ok(())
    }

    fn bad_data_error(&self, message: &str) -> CsvError {
        let raw = self.config.exception_messages_contain_raw_data();
        CsvError::BadData {
            row: self.row + 1,
            field_index: self.record.len(),
            field: raw.then(|| self.field.clone()),
            raw_record: raw.then(|| self.raw_record.clone()),
            message: message.to_string(),
        }
    }

    fn end_field(&mut self) {
        match self.replacement.take() {
            Some(value) => self.record.push_field(&value),
            None => {
                let trim = self.config.trim_options();
                let should_trim = if self.quoted {
                    trim.inside_quotes
                } else {
                    trim.trim
                };
                if should_trim {
                    self.record
                        .push_field(self.field.trim_matches(defaults::WHITESPACE));
                } else {
                    self.record.push_field(&self.field);
                }
            }
        }

        self.field.clear();
        self.quoted = false;
        self.field_reported = false;
        self.state = State::FieldStart;
    }

    fn end_line(&mut self) -> Result<bool, CsvError> {
        // Queued characters were read past the line ending and belong to the next line
        let tail: usize = self.replay.iter().map(|c| c.len_utf8()).sum();
        self.raw_tail = self.raw_record.split_off(self.raw_record.len() - tail);
        self.row += 1;
        self.line_done = true;

        if self.state == State::Comment {
            self.state = State::FieldStart;
            debug!(row = self.row, "discarded comment line");
            return Ok(false);
        }

        let blank =
            self.state == State::FieldStart && self.field.is_empty() && self.record.is_empty();
        if blank {
            if self.config.ignore_blank_lines() {
                return Ok(false);
            }
            self.record.push_field("");
            self.record_complete = true;
            return Ok(true);
        }

        self.end_field();
        self.record_complete = true;
        Ok(true)
    }
}

fn is_whitespace(c: char) -> bool {
    defaults::WHITESPACE.contains(&c)
}
