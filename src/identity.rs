use std::fmt;

use tracing::trace;

use crate::consts::Md5;
use crate::util::{clean_path, normalize_separators};

/// MD5 digest of a loaded file's normalized absolute path.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(Md5);

impl FileId {
    /// `path` must already be absolute. Separators are normalized, `.`/`..`
    /// resolved and the result lower-cased before hashing.
    pub fn from_path(path: &str) -> FileId {
        let normalized = clean_path(&normalize_separators(path)).to_lowercase();
        FileId(md5::compute(normalized.as_bytes()).0)
    }

    #[inline]
    pub fn md5(&self) -> &Md5 {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self)
    }
}

/// Set of ids of the files currently loaded, kept sorted for binary search.
#[derive(Debug, Default)]
pub struct FileIdentityRegistry {
    ids: Vec<FileId>,
}

impl FileIdentityRegistry {
    pub fn new() -> Self {
        FileIdentityRegistry { ids: Vec::new() }
    }

    /// Registers `path`. Returns `false` without changing anything if it was
    /// already registered.
    pub fn check_and_register(&mut self, path: &str) -> bool {
        self.register(FileId::from_path(path))
    }

    pub fn register(&mut self, id: FileId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => {
                trace!("identity {} already registered", id);
                false
            },
            Err(index) => {
                self.ids.insert(index, id);
                true
            },
        }
    }

    /// Removes `path`. Returns whether it was registered.
    pub fn release(&mut self, path: &str) -> bool {
        self.release_id(&FileId::from_path(path))
    }

    pub fn release_id(&mut self, id: &FileId) -> bool {
        match self.ids.binary_search(id) {
            Ok(index) => {
                self.ids.remove(index);
                true
            },
            Err(_) => false,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.contains_id(&FileId::from_path(path))
    }

    #[inline]
    pub fn contains_id(&self, id: &FileId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, FileId> {
        self.ids.iter()
    }
}
