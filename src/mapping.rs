use tracing::info;

use crate::result::{Result, Error};
use crate::util::{eq_ignore_case, starts_with_ignore_case};

/// Redirects an absolute virtual path to a lump name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumpMapping {
    pub(crate) path: String,
    pub(crate) lump: String,
}

impl LumpMapping {
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn lump(&self) -> &str {
        &self.lump
    }
}

/// Makes the files of native directory `source` appear under `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    pub(crate) source:      String,
    pub(crate) destination: String,
}

impl PathMapping {
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Swaps a leading `destination` in `path` for `source`. `None` when
    /// `path` does not start with `destination` (case-insensitive).
    pub fn apply(&self, path: &str) -> Option<String> {
        if !starts_with_ignore_case(path, &self.destination) {
            return None;
        }

        let mut mapped = String::with_capacity(self.source.len() + path.len() - self.destination.len());
        mapped.push_str(&self.source);
        mapped.push_str(&path[self.destination.len()..]);
        Some(mapped)
    }

    /// The reverse of [`apply`](Self::apply): presents a native `path`
    /// under `destination`.
    pub fn unapply(&self, path: &str) -> Option<String> {
        if !starts_with_ignore_case(path, &self.source) {
            return None;
        }

        let mut mapped = String::with_capacity(self.destination.len() + path.len() - self.source.len());
        mapped.push_str(&self.destination);
        mapped.push_str(&path[self.source.len()..]);
        Some(mapped)
    }
}

/// The two ordered redirection tables consulted while resolving a path.
/// Registering the same key again updates that mapping where it stands.
#[derive(Debug, Default)]
pub struct PathMappingTables {
    lump_mappings: Vec<LumpMapping>,
    path_mappings: Vec<PathMapping>,
}

impl PathMappingTables {
    pub fn new() -> Self {
        PathMappingTables::default()
    }

    /// Maps absolute virtual `path` to `lump_name`. Returns `true` when a new
    /// mapping was added and `false` when an existing one was updated.
    pub fn add_lump_mapping(&mut self, lump_name: &str, path: &str) -> Result<bool> {
        if lump_name.is_empty() {
            return Err(Error::illegal_argument("lump name", lump_name));
        }
        if path.is_empty() {
            return Err(Error::illegal_argument("path", path));
        }

        let added = match self.lump_mappings.iter_mut().find(|mapping| eq_ignore_case(&mapping.path, path)) {
            Some(mapping) => {
                mapping.lump = lump_name.to_owned();
                false
            },
            None => {
                self.lump_mappings.push(LumpMapping {
                    path: path.to_owned(),
                    lump: lump_name.to_owned(),
                });
                true
            },
        };

        info!("path {:?} now mapped to lump {:?}", path, lump_name);
        Ok(added)
    }

    pub fn add_directory_mapping(&mut self, source: &str, destination: &str) -> Result<bool> {
        if source.is_empty() {
            return Err(Error::illegal_argument("source", source));
        }
        if destination.is_empty() {
            return Err(Error::illegal_argument("destination", destination));
        }

        let added = match self.path_mappings.iter_mut().find(|mapping| eq_ignore_case(&mapping.source, source)) {
            Some(mapping) => {
                mapping.destination = destination.to_owned();
                false
            },
            None => {
                self.path_mappings.push(PathMapping {
                    source:      source.to_owned(),
                    destination: destination.to_owned(),
                });
                true
            },
        };

        info!("path {:?} now mapped to {:?}", source, destination);
        Ok(added)
    }

    pub fn lumps_for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.lump_mappings.iter()
            .filter(move |mapping| eq_ignore_case(&mapping.path, path))
            .map(|mapping| mapping.lump.as_str())
    }

    /// Native paths to try for `path`: each applicable directory mapping in
    /// registration order, then `path` itself.
    pub fn native_candidates(&self, path: &str) -> Vec<String> {
        let mut candidates: Vec<String> = self.path_mappings.iter()
            .filter_map(|mapping| mapping.apply(path))
            .collect();
        candidates.push(path.to_owned());
        candidates
    }

    #[inline]
    pub fn lump_mappings(&self) -> &[LumpMapping] {
        &self.lump_mappings
    }

    #[inline]
    pub fn path_mappings(&self) -> &[PathMapping] {
        &self.path_mappings
    }

    #[inline]
    pub fn clear_lump_mappings(&mut self) {
        self.lump_mappings.clear();
    }

    #[inline]
    pub fn clear_path_mappings(&mut self) {
        self.path_mappings.clear();
    }
}
