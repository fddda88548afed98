use std::sync::Arc;

use crate::container::ContainerId;
use crate::util::{compare_ignore_case, eq_ignore_case};

/// Range of a WAD directory a lump was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LumpGroup {
    None,
    Flats,
    Sprites,
}

impl LumpGroup {
    pub fn name(&self) -> &'static str {
        match self {
            LumpGroup::None    => "",
            LumpGroup::Flats   => "flats",
            LumpGroup::Sprites => "sprites",
        }
    }
}

impl Default for LumpGroup {
    #[inline]
    fn default() -> Self {
        LumpGroup::None
    }
}

/// One logical file inside a container. For WAD lumps `path` is the lump
/// name, otherwise the absolute virtual path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub(crate) path:      String,
    pub(crate) container: ContainerId,
    pub(crate) index:     usize,
    pub(crate) offset:    u64,
    pub(crate) size:      u64,
    pub(crate) group:     LumpGroup,
    pub(crate) crc32:     Option<u32>,
}

impl Entry {
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn group(&self) -> LumpGroup {
        self.group
    }

    #[inline]
    pub fn crc32(&self) -> Option<u32> {
        self.crc32
    }
}

// ZIP sets are sorted by path for `find`. WAD sets keep directory order,
// marker ranges depend on it.
#[derive(Debug, Clone, Default)]
pub struct EntrySet {
    entries: Vec<Arc<Entry>>,
    sorted:  bool,
}

impl EntrySet {
    pub fn new() -> Self {
        EntrySet {
            entries: Vec::new(),
            sorted:  false,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        EntrySet {
            entries: Vec::with_capacity(capacity),
            sorted:  false,
        }
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(Arc::new(entry));
        self.sorted = false;
    }

    pub fn sort_by_path(&mut self) {
        self.entries.sort_by(|a, b| compare_ignore_case(&a.path, &b.path));
        self.sorted = true;
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Index of the entry with exactly `path` (case-insensitive).
    ///
    /// On a sorted set this is a binary search returning the first of several
    /// equal paths. On an unsorted set the last equal path is returned, which is
    /// the one that overrides the others.
    pub fn find(&self, path: &str) -> Option<usize> {
        if self.sorted {
            let index = self.entries.partition_point(|entry|
                compare_ignore_case(&entry.path, path) == std::cmp::Ordering::Less);

            match self.entries.get(index) {
                Some(entry) if eq_ignore_case(&entry.path, path) => Some(index),
                _ => None,
            }
        } else {
            self.entries.iter().rposition(|entry| eq_ignore_case(&entry.path, path))
        }
    }

    pub fn iterate(&self, mut predicate: impl FnMut(&Entry) -> bool) -> Option<usize> {
        self.entries.iter().position(|entry| predicate(entry))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Arc<Entry>> {
        self.entries.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Entry>> {
        self.entries.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Arc<Entry>] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a Arc<Entry>;
    type IntoIter = std::slice::Iter<'a, Arc<Entry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
