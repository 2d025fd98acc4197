//! Block buffer shared by the blocking and async parsers
//!
//! Bytes are read in blocks of `buffer_size` and decoded to text one block at a
//! time. A UTF-8 sequence cut by the end of a block is carried over and completed
//! by the next one, so the character stream handed to the tokenizer is the same
//! whatever the block size.

use crate::types::CsvError;

/// Longest incomplete UTF-8 sequence that can end a block
const MAX_CARRY: usize = 3;

#[derive(Debug)]
pub struct BlockDecoder {
    bytes: Vec<u8>,
    block_size: usize,
    carry: usize,
    text: String,
    pos: usize,
    eof: bool,
}

impl BlockDecoder {
    pub fn new(block_size: usize) -> Self {
        Self {
            bytes: vec![0; block_size + MAX_CARRY],
            block_size,
            carry: 0,
            text: String::with_capacity(block_size),
            pos: 0,
            eof: false,
        }
    }

    /// Next decoded character of the current block
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.text[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Whether the underlying reader reported end of input
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Space for the next block, after any carried bytes
    pub fn spare_mut(&mut self) -> &mut [u8] {
        let end = self.carry + self.block_size;
        &mut self.bytes[self.carry..end]
    }

    /// Decode the `read` bytes just written into [`spare_mut`](Self::spare_mut)
    ///
    /// A read of zero bytes marks the end of input. `row` is only used for the
    /// error raised on invalid UTF-8.
    pub fn commit(&mut self, read: usize, row: u64) -> Result<(), CsvError> {
        self.text.clear();
        self.pos = 0;

        if read == 0 {
            self.eof = true;
            if self.carry > 0 {
                return Err(CsvError::InvalidUtf8 { row });
            }
            return Ok(());
        }

        let filled = self.carry + read;
        match std::str::from_utf8(&self.bytes[..filled]) {
            Ok(text) => {
                self.text.push_str(text);
                self.carry = 0;
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = std::str::from_utf8(&self.bytes[..valid])
                    .map_err(|_| CsvError::InvalidUtf8 { row })?;
                self.text.push_str(text);
                self.bytes.copy_within(valid..filled, 0);
                self.carry = filled - valid;
            }
            Err(_) => return Err(CsvError::InvalidUtf8 { row }),
        }
        Ok(())
    }
}
