//! Header name index
//!
//! Maps prepared header names to the ordered list of columns that carry them, so
//! duplicate names are told apart by occurrence. Successful lookups are cached per
//! requested name set and occurrence.
//!
//! # Design
//!
//! The index is built in one go from a header record and never patched: capturing
//! a new header replaces the whole value, which drops the cache with it.

use crate::config::CsvConfig;
use crate::types::Record;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    header: Record,
    positions: HashMap<String, Vec<usize>>,
    single_cache: HashMap<String, HashMap<usize, usize>>,
    multi_cache: HashMap<Vec<String>, HashMap<usize, usize>>,
}

impl HeaderIndex {
    /// Index a header record, preparing every name with the configured function
    pub fn new(header: &Record, config: &CsvConfig) -> Self {
        let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, name) in header.iter().enumerate() {
            positions
                .entry(config.prepare_header(name, position))
                .or_default()
                .push(position);
        }

        Self {
            header: header.clone(),
            positions,
            single_cache: HashMap::new(),
            multi_cache: HashMap::new(),
        }
    }

    /// The captured header record, names as read
    pub fn header(&self) -> &Record {
        &self.header
    }

    /// Columns carrying a prepared name, in header order
    pub fn positions(&self, prepared: &str) -> Option<&[usize]> {
        self.positions.get(prepared).map(Vec::as_slice)
    }

    /// Resolve the first of `names` present in the header to the column of its
    /// `occurrence`-th appearance
    ///
    /// # Arguments
    ///
    /// * `names` - Alternative names, tried in order
    /// * `occurrence` - 0-based occurrence among duplicate headers
    /// * `config` - Supplies the name preparation function
    ///
    /// # Returns
    ///
    /// The column position, or `None` when no name matches or the matching name
    /// has fewer occurrences
    pub fn resolve(&mut self, names: &[&str], occurrence: usize, config: &CsvConfig) -> Option<usize> {
        if let Some(position) = self.cached(names, occurrence) {
            return Some(position);
        }

        let prepared = names
            .iter()
            .enumerate()
            .map(|(i, name)| config.prepare_header(name, i))
            .find(|name| self.positions.contains_key(name))?;
        let position = *self.positions.get(&prepared)?.get(occurrence)?;

        match names {
            [name] => {
                self.single_cache
                    .entry(name.to_string())
                    .or_default()
                    .insert(occurrence, position);
            }
            _ => {
                let key = names.iter().map(|n| n.to_string()).collect();
                self.multi_cache
                    .entry(key)
                    .or_default()
                    .insert(occurrence, position);
            }
        }

        Some(position)
    }

    fn cached(&self, names: &[&str], occurrence: usize) -> Option<usize> {
        let by_occurrence = match names {
            [name] => self.single_cache.get(*name)?,
            _ => {
                let key: Vec<String> = names.iter().map(|n| n.to_string()).collect();
                self.multi_cache.get(&key)?
            }
        };
        by_occurrence.get(&occurrence).copied()
    }

    /// Number of cached resolutions
    pub fn cached_len(&self) -> usize {
        self.single_cache.values().map(HashMap::len).sum::<usize>()
            + self.multi_cache.values().map(HashMap::len).sum::<usize>()
    }
}
