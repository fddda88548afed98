use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::container::ContainerId;
use crate::entry::Entry;
use crate::util::{eq_ignore_case, file_name, match_path_suffix, strip_lump_extension};

#[derive(Debug, Clone)]
struct Record {
    entry:      Arc<Entry>,
    generation: u64,
}

/// Catalog of the entries of every loaded container, in load order.
///
/// Lookups by path compare the query's segments against the trailing
/// segments of each entry path and prefer the entry catalogued last, so a
/// container loaded later overrides earlier ones without removing them.
#[derive(Debug, Default)]
pub struct LumpIndex {
    records:    Vec<Record>,
    generation: u64,
    // lower-cased last segment -> positions in ascending load order
    by_name:    HashMap<String, Vec<usize>>,
}

fn hash_key(path: &str) -> String {
    strip_lump_extension(file_name(path)).to_lowercase()
}

impl LumpIndex {
    pub fn new() -> Self {
        LumpIndex::default()
    }

    pub fn catalog(&mut self, entry: Arc<Entry>) {
        self.generation += 1;
        self.push(entry);
    }

    /// Appends all `entries` as one generation, keeping their order.
    pub fn catalog_all<'a>(&mut self, entries: impl IntoIterator<Item = &'a Arc<Entry>>) -> usize {
        self.generation += 1;
        let before = self.records.len();
        for entry in entries {
            self.push(entry.clone());
        }
        self.records.len() - before
    }

    fn push(&mut self, entry: Arc<Entry>) {
        let index = self.records.len();
        self.by_name.entry(hash_key(entry.path())).or_default().push(index);
        self.records.push(Record {
            entry,
            generation: self.generation,
        });
    }

    fn rebuild_names(&mut self) {
        self.by_name.clear();
        for (index, record) in self.records.iter().enumerate() {
            self.by_name.entry(hash_key(record.entry.path())).or_default().push(index);
        }
    }

    /// Removes every entry of `container`, keeping the others in order.
    /// Returns how many were removed.
    pub fn prune_by_container(&mut self, container: ContainerId) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.entry.container() != container);
        let pruned = before - self.records.len();

        if pruned > 0 {
            self.rebuild_names();
            debug!("pruned {} entries of container {}", pruned, container);
        }

        pruned
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.by_name.clear();
    }

    pub fn catalogues(&self, container: ContainerId) -> bool {
        self.records.iter().any(|record| record.entry.container() == container)
    }

    fn candidates<'a>(&'a self, path: &'a str) -> impl DoubleEndedIterator<Item = usize> + 'a {
        let bucket: &[usize] = if path.trim_matches('/').is_empty() {
            &[]
        } else {
            self.by_name.get(&hash_key(path)).map(|bucket| bucket.as_slice()).unwrap_or(&[])
        };

        bucket.iter().cloned().filter(move |index| match_path_suffix(self.records[*index].entry.path(), path))
    }

    /// Position of the entry matching `path` that was catalogued last.
    pub fn find_last(&self, path: &str) -> Option<usize> {
        self.candidates(path).next_back()
    }

    /// Position of the last catalogued entry whose whole path equals `path`,
    /// ignoring case. No segment or extension matching.
    pub fn find_last_exact(&self, path: &str) -> Option<usize> {
        self.by_name.get(&hash_key(path))?.iter().cloned()
            .rev()
            .find(|index| eq_ignore_case(self.records[*index].entry.path(), path))
    }

    pub fn find_first(&self, path: &str) -> Option<usize> {
        self.candidates(path).next()
    }

    pub fn find_all(&self, path: &str) -> Vec<usize> {
        self.candidates(path).collect()
    }

    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.find_first(path).is_some()
    }

    pub fn find_last_matching(&self, mut predicate: impl FnMut(&Entry) -> bool) -> Option<usize> {
        self.records.iter().rposition(|record| predicate(&record.entry))
    }

    pub fn iterate(&self, mut predicate: impl FnMut(&Entry) -> bool) -> Option<usize> {
        self.records.iter().position(|record| predicate(&record.entry))
    }

    pub fn find_all_matching(&self, mut predicate: impl FnMut(&Entry) -> bool) -> Vec<Arc<Entry>> {
        self.records.iter()
            .filter(|record| predicate(&record.entry))
            .map(|record| record.entry.clone())
            .collect()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Arc<Entry>> {
        self.records.get(index).map(|record| &record.entry)
    }

    /// Catalog generation `index` was added in. Entries of one container
    /// share a generation.
    #[inline]
    pub fn generation(&self, index: usize) -> Option<u64> {
        self.records.get(index).map(|record| record.generation)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entry>> + '_ {
        self.records.iter().map(|record| &record.entry)
    }
}
