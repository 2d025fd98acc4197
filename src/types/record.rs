use std::fmt;
use std::ops::Range;

/// One tokenized CSV record
///
/// Fields are stored back to back in a single text buffer with their end offsets
/// kept separately, so clearing and refilling a record reuses both allocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    text: String,
    ends: Vec<usize>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Field at `index`, or `None` when out of bounds
    pub fn get(&self, index: usize) -> Option<&str> {
        self.range(index).map(|range| &self.text[range])
    }

    /// Iterate over the fields in order
    pub fn iter(&self) -> RecordIter<'_> {
        RecordIter {
            record: self,
            index: 0,
        }
    }

    /// Copy the fields into owned strings
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    /// Append a field
    pub fn push_field(&mut self, field: &str) {
        self.text.push_str(field);
        self.ends.push(self.text.len());
    }

    /// Remove every field, keeping the allocations
    pub fn clear(&mut self) {
        self.text.clear();
        self.ends.clear();
    }

    fn range(&self, index: usize) -> Option<Range<usize>> {
        let end = *self.ends.get(index)?;
        let start = match index {
            0 => 0,
            _ => self.ends[index - 1],
        };
        Some(start..end)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Record {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut record = Record::new();
        for field in iter {
            record.push_field(field.as_ref());
        }
        record
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// Iterator over the fields of a [`Record`]
#[derive(Debug, Clone)]
pub struct RecordIter<'a> {
    record: &'a Record,
    index: usize,
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let field = self.record.get(self.index)?;
        self.index += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.record.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RecordIter<'_> {}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a str;
    type IntoIter = RecordIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_indexes_fields() {
        let record: Record = ["a", "", "ccc"].into_iter().collect();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get(0), Some("a"));
        assert_eq!(record.get(1), Some(""));
        assert_eq!(record.get(2), Some("ccc"));
        assert_eq!(record.get(3), None);
    }

    #[test]
    fn test_record_clear_keeps_capacity() {
        let mut record: Record = ["one", "two"].into_iter().collect();
        let capacity = record.text.capacity();
        record.clear();
        assert!(record.is_empty());
        assert_eq!(record.text.capacity(), capacity);
        record.push_field("x");
        assert_eq!(record.to_vec(), vec!["x".to_string()]);
    }

    #[test]
    fn test_record_display() {
        let record: Record = ["1", "one"].into_iter().collect();
        assert_eq!(record.to_string(), "1, one");
    }
}
