use std::cell::Cell;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fs;
use std::io::Read;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::config::FsConfig;
use crate::consts::LUMP_EXTENSION;
use crate::container::{Container, ContainerId, ContainerKind};
use crate::entry::{Entry, EntrySet, LumpGroup};
use crate::file_type::{interpret, FileType};
use crate::handle::{FileHandle, HandleId, OpenFiles, OpenMode};
use crate::identity::{FileId, FileIdentityRegistry};
use crate::io::Window;
use crate::lump_index::LumpIndex;
use crate::mapping::PathMappingTables;
use crate::result::{Result, Error};
use crate::util::{
    eq_ignore_case, file_name, file_name_extension, file_name_path, file_name_without_extension,
    make_absolute, match_file_name, match_path_suffix, native_path, strip_lump_extension,
};
use crate::wad::Wad;
use crate::zip::Zip;

const GWA_EXTENSION: &str = "gwa";
const ENGINE_WAD: &str = "doomsday.wad";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsState {
    Uninitialized,
    Initialized,
    LoadingStartup,
    SteadyState,
    ShuttingDown,
}

impl FsState {
    pub fn name(&self) -> &'static str {
        match self {
            FsState::Uninitialized  => "uninitialized",
            FsState::Initialized    => "initialized",
            FsState::LoadingStartup => "loading startup files",
            FsState::SteadyState    => "in steady state",
            FsState::ShuttingDown   => "shutting down",
        }
    }
}

struct Source {
    path:   String,
    window: Window,
    parent: Option<ContainerId>,
    entry:  Option<Arc<Entry>>,
    native: bool,
}

/// The layered file system: every loaded container, the indexes over their
/// entries, the loaded file identities and the path mappings.
pub struct VirtualFileSystem {
    config:           FsConfig,
    state:            FsState,
    containers:       HashMap<ContainerId, Container>,
    loaded:           Vec<ContainerId>,
    next_container:   u32,
    primary_index:    LumpIndex,
    zip_index:        LumpIndex,
    file_ids:         FileIdentityRegistry,
    mappings:         PathMappingTables,
    open_files:       OpenFiles,
    next_handle:      u64,
    loaded_files_crc: Cell<Option<u32>>,
}

impl VirtualFileSystem {
    pub fn new(config: FsConfig) -> Self {
        VirtualFileSystem {
            config,
            state:            FsState::Uninitialized,
            containers:       HashMap::new(),
            loaded:           Vec::new(),
            next_container:   1,
            primary_index:    LumpIndex::new(),
            zip_index:        LumpIndex::new(),
            file_ids:         FileIdentityRegistry::new(),
            mappings:         PathMappingTables::new(),
            open_files:       OpenFiles::default(),
            next_handle:      1,
            loaded_files_crc: Cell::new(None),
        }
    }

    pub fn init(&mut self) -> Result<()> {
        if self.state != FsState::Uninitialized {
            return Err(Error::invalid_state(self.state.name()));
        }
        self.state = FsState::Initialized;
        debug!("file system initialized with base {:?}", self.config.base_path);
        Ok(())
    }

    pub fn begin_startup(&mut self) -> Result<()> {
        match self.state {
            FsState::Initialized | FsState::SteadyState => {
                self.state = FsState::LoadingStartup;
                Ok(())
            },
            state => Err(Error::invalid_state(state.name())),
        }
    }

    pub fn end_startup(&mut self) -> Result<()> {
        if self.state != FsState::LoadingStartup {
            return Err(Error::invalid_state(self.state.name()));
        }
        self.state = FsState::SteadyState;
        Ok(())
    }

    /// Unloads everything in reverse load order and drops all identities,
    /// mappings and open file records.
    pub fn shutdown(&mut self) -> Result<()> {
        match self.state {
            FsState::Uninitialized | FsState::ShuttingDown => return Err(Error::invalid_state(self.state.name())),
            _ => {},
        }
        self.state = FsState::ShuttingDown;

        for id in self.loaded.clone().into_iter().rev() {
            self.deindex(id)?;
        }

        if !self.file_ids.is_empty() {
            warn!("{} file identities left after unloading every file", self.file_ids.len());
        }

        self.open_files.lock().clear();
        self.primary_index.clear();
        self.zip_index.clear();
        self.file_ids.clear();
        self.mappings.clear_lump_mappings();
        self.mappings.clear_path_mappings();
        Ok(())
    }

    #[inline]
    pub fn state(&self) -> FsState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    fn require_active(&self) -> Result<()> {
        match self.state {
            FsState::Initialized | FsState::LoadingStartup | FsState::SteadyState => Ok(()),
            state => Err(Error::invalid_state(state.name())),
        }
    }

    pub fn absolute_path(&self, path: &str) -> String {
        make_absolute(&self.config.base_path, path)
    }

    #[inline]
    pub fn add_file(&mut self, path: &str) -> Result<ContainerId> {
        self.index(path, false)
    }

    /// Loads `path`, which may name an entry of a loaded ZIP. A failed load
    /// leaves the indexes and the identity registry as they were.
    pub fn index(&mut self, path: &str, allow_duplicate: bool) -> Result<ContainerId> {
        self.require_active()?;

        if path.is_empty() {
            return Err(Error::illegal_argument("path", path));
        }

        let abs_path = self.absolute_path(path);
        let source = match self.resolve(&abs_path, false) {
            Some(source) => source,
            None => return Err(Error::not_found(&abs_path)),
        };

        let id = self.load(source, &abs_path, allow_duplicate)?;

        if self.config.load_gwa_companions {
            self.load_gwa_companion(id, allow_duplicate);
        }

        Ok(id)
    }

    fn load(&mut self, mut source: Source, abs_path: &str, allow_duplicate: bool) -> Result<ContainerId> {
        let file_id = FileId::from_path(abs_path);
        if !allow_duplicate && !self.file_ids.register(file_id) {
            warn!("{:?} is already loaded", abs_path);
            return Err(Error::duplicate_load(abs_path).with_path(abs_path));
        }
        let file_id = if allow_duplicate { None } else { Some(file_id) };

        let id = ContainerId(self.next_container);
        self.next_container += 1;

        let parsed = parse_container(&mut source.window, abs_path, id, &self.config);
        let (kind, entries) = match parsed {
            Ok(parsed) => parsed,
            Err(error) => {
                if let Some(file_id) = &file_id {
                    self.file_ids.release_id(file_id);
                }
                return Err(error.or_path(abs_path));
            },
        };

        let startup = self.state == FsState::LoadingStartup;
        let container = Container {
            id,
            path: abs_path.to_owned(),
            file_id,
            kind,
            window: source.window.rewound(),
            entries,
            parent: source.parent,
            startup,
            custom: true,
        };

        let cataloged = self.primary_index.catalog_all(&container.entries);
        if kind == ContainerKind::Zip {
            self.zip_index.catalog_all(&container.entries);
        }

        info!("loaded {} {:?} ({} entries{})", kind.name(), abs_path, cataloged,
            if startup { ", startup" } else { "" });
        trace!("{:?} read from {:?}", abs_path, source.path);

        self.containers.insert(id, container);
        self.loaded.push(id);
        self.loaded_files_crc.set(None);

        Ok(id)
    }

    fn load_gwa_companion(&mut self, id: ContainerId, allow_duplicate: bool) {
        let companion = match self.containers.get(&id) {
            Some(container) if container.kind.is_wad() && container.parent.is_none() => {
                match file_name_extension(&container.path) {
                    Some(ext) if eq_ignore_case(ext, "wad") => format!("{}{}.{}",
                        file_name_path(&container.path),
                        file_name_without_extension(&container.path),
                        GWA_EXTENSION),
                    _ => return,
                }
            },
            _ => return,
        };

        if !native_path(&companion).is_file() {
            return;
        }

        if let Err(error) = self.index(&companion, allow_duplicate) {
            warn!("failed to load GWA companion: {}", error);
        }
    }

    /// Unloads container `id`, and before it every container that was read
    /// from inside it.
    pub fn deindex(&mut self, id: ContainerId) -> Result<()> {
        if !self.containers.contains_key(&id) {
            return Err(Error::not_found(id.to_string()));
        }

        let children: Vec<ContainerId> = self.loaded.iter().rev()
            .filter(|child| self.containers.get(*child).map_or(false, |container| container.parent == Some(id)))
            .cloned()
            .collect();
        for child in children {
            self.deindex(child)?;
        }

        self.zip_index.prune_by_container(id);
        self.primary_index.prune_by_container(id);
        self.release_file(id);
        self.loaded.retain(|loaded| *loaded != id);
        self.loaded_files_crc.set(None);

        if let Some(container) = self.containers.remove(&id) {
            if let Some(file_id) = &container.file_id {
                self.file_ids.release_id(file_id);
            }
            info!("unloaded {:?}", container.path);
        }

        Ok(())
    }

    pub fn remove_file(&mut self, path: &str) -> Result<()> {
        let id = match self.find(path) {
            Some(container) => container.id,
            None => return Err(Error::not_found(self.absolute_path(path))),
        };
        self.deindex(id)
    }

    /// Unloads every file not flagged as startup file, latest first. Returns
    /// how many were unloaded.
    pub fn unload_all_non_startup(&mut self) -> Result<usize> {
        let mut count = 0;
        for id in self.loaded.clone().into_iter().rev() {
            let startup = match self.containers.get(&id) {
                Some(container) => container.startup,
                None => continue,
            };
            if startup {
                continue;
            }
            self.deindex(id)?;
            count += 1;
        }

        if count > 0 {
            info!("unloaded {} non-startup files", count);
        }
        Ok(count)
    }

    pub fn set_custom(&mut self, id: ContainerId, custom: bool) -> Result<()> {
        match self.containers.get_mut(&id) {
            Some(container) => {
                container.custom = custom;
                self.loaded_files_crc.set(None);
                Ok(())
            },
            None => Err(Error::not_found(id.to_string())),
        }
    }

    fn find_lump(&self, abs_path: &str) -> Option<Arc<Entry>> {
        if let Some(index) = self.zip_index.find_last_exact(abs_path) {
            return self.zip_index.get(index).cloned();
        }

        for lump_name in self.mappings.lumps_for_path(abs_path) {
            if let Some(index) = self.lump_num_for_name(lump_name) {
                return self.primary_index.get(index).cloned();
            }
        }

        None
    }

    fn entry_window(&self, entry: &Entry) -> Result<Window> {
        match self.containers.get(&entry.container) {
            Some(container) => container.window.slice(&entry.path, entry.offset, entry.size)
                .map_err(|error| error.or_path(&container.path)),
            None => Err(Error::not_found(&entry.path)),
        }
    }

    fn resolve(&self, abs_path: &str, native_only: bool) -> Option<Source> {
        trace!("resolving {:?}", abs_path);

        if !native_only {
            if let Some(entry) = self.find_lump(abs_path) {
                if let Ok(window) = self.entry_window(&entry) {
                    return Some(Source {
                        path:   entry.path.clone(),
                        window,
                        parent: Some(entry.container),
                        entry:  Some(entry),
                        native: false,
                    });
                }
            }
        }

        for candidate in self.mappings.native_candidates(abs_path) {
            trace!("trying native file {:?}", candidate);
            let native = native_path(&candidate);
            if !native.is_file() {
                continue;
            }
            match Window::open(&native) {
                Ok(window) => return Some(Source {
                    path:   candidate,
                    window,
                    parent: None,
                    entry:  None,
                    native: true,
                }),
                Err(error) => debug!("cannot open {:?}: {}", candidate, error),
            }
        }

        None
    }

    pub fn access_file(&self, path: &str) -> bool {
        !path.is_empty() && self.resolve(&self.absolute_path(path), false).is_some()
    }

    fn next_handle_id(&mut self) -> HandleId {
        let id = HandleId(self.next_handle);
        self.next_handle += 1;
        id
    }

    // reads try the ZIP index, the lump mappings, native files (mapped, then
    // unmapped) and last the lump names; writes always go to the native file
    pub fn open_file(&mut self, path: &str, mode: &str) -> Result<FileHandle> {
        let mode = OpenMode::try_from(mode)?;
        if path.is_empty() {
            return Err(Error::illegal_argument("path", path));
        }

        let abs_path = self.absolute_path(path);

        if mode.write {
            let file = fs::File::create(native_path(&abs_path))
                .map_err(|error| Error::io_with_path(error, &abs_path))?;
            let handle = FileHandle::for_write(self.next_handle_id(), abs_path, file);
            return Ok(handle.register(&self.open_files));
        }

        let source = match self.resolve(&abs_path, mode.native_only) {
            Some(source) => Some(source),
            None if !mode.native_only => self.lump_num_for_name(path)
                .and_then(|index| self.primary_index.get(index).cloned())
                .and_then(|entry| self.entry_window(&entry).ok().map(|window| Source {
                    path:   entry.path.clone(),
                    window,
                    parent: Some(entry.container),
                    entry:  Some(entry),
                    native: false,
                })),
            None => None,
        };

        let source = match source {
            Some(source) => source,
            None => return Err(Error::not_found(&abs_path)),
        };

        let container = if source.native { None } else { source.parent };
        let handle = FileHandle::for_read(self.next_handle_id(), abs_path, container, source.entry, source.window);
        Ok(handle.register(&self.open_files))
    }

    pub fn open_lump(&mut self, lump_num: usize) -> Result<FileHandle> {
        let entry = self.lump(lump_num)?.clone();
        let window = self.entry_window(&entry)?;
        let handle = FileHandle::for_read(self.next_handle_id(), entry.path.clone(), Some(entry.container), Some(entry.clone()), window);
        Ok(handle.register(&self.open_files))
    }

    /// Drops `handle`. Returns whether its open file record was still
    /// present. Dropping a handle without `close` removes the record too.
    pub fn close(&mut self, handle: FileHandle) -> bool {
        let present = self.open_files.lock().iter().any(|record| record.handle == handle.id);
        drop(handle);
        present
    }

    /// Forgets the open file records of every handle on `container`. The
    /// handles themselves stay readable.
    pub fn release_file(&mut self, container: ContainerId) -> usize {
        let mut open_files = self.open_files.lock();
        let before = open_files.len();
        open_files.retain(|record| record.container != Some(container));
        before - open_files.len()
    }

    #[inline]
    pub fn open_file_count(&self) -> usize {
        self.open_files.lock().len()
    }

    /// Lump number of the last loaded lump called `name`. Without an
    /// extension `name` also finds `name.lmp` inside ZIPs.
    pub fn lump_num_for_name(&self, name: &str) -> Option<usize> {
        let query = lump_query(name)?;
        self.primary_index.find_last(query)
    }

    pub fn find_first_lump(&self, name: &str) -> Option<usize> {
        let query = lump_query(name)?;
        self.primary_index.find_first(query)
    }

    pub fn find_all_lumps(&self, name: &str) -> Vec<usize> {
        match lump_query(name) {
            Some(query) => self.primary_index.find_all(query),
            None => Vec::new(),
        }
    }

    /// Like [`lump_num_for_name`](Self::lump_num_for_name) restricted to
    /// lumps in a WAD flats or sprites range.
    pub fn find_last_in_group(&self, name: &str, group: LumpGroup) -> Option<usize> {
        let query = lump_query(name)?;
        self.primary_index.find_last_matching(|entry| entry.group == group && match_path_suffix(&entry.path, query))
    }

    pub fn lump(&self, lump_num: usize) -> Result<&Arc<Entry>> {
        match self.primary_index.get(lump_num) {
            Some(entry) => Ok(entry),
            None => Err(Error::not_found(format!("lump #{} (valid range: 0..{})", lump_num, self.primary_index.len()))),
        }
    }

    #[inline]
    pub fn lump_count(&self) -> usize {
        self.primary_index.len()
    }

    pub fn lump_window(&self, lump_num: usize) -> Result<Window> {
        let entry = self.lump(lump_num)?;
        self.entry_window(entry)
    }

    pub fn read_lump(&self, lump_num: usize) -> Result<Vec<u8>> {
        let entry = self.lump(lump_num)?;
        let mut window = self.entry_window(entry)?;
        let mut data = Vec::with_capacity(entry.size as usize);
        window.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Reads `len` bytes at `offset` of lump `lump_num`. Ranges reaching past
    /// the end of the lump fail.
    pub fn read_lump_section(&self, lump_num: usize, offset: u64, len: u64) -> Result<Vec<u8>> {
        let entry = self.lump(lump_num)?;
        let window = self.entry_window(entry)?;
        let section = window.slice(&entry.path, offset, len)?;

        let mut data = vec![0u8; len as usize];
        section.read_exact_at(0, &mut data)?;
        Ok(data)
    }

    pub fn lump_source_file(&self, lump_num: usize) -> Result<&str> {
        let entry = self.lump(lump_num)?;
        match self.containers.get(&entry.container) {
            Some(container) => Ok(&container.path),
            None => Err(Error::not_found(entry.container.to_string())),
        }
    }

    #[inline]
    pub fn primary_index(&self) -> &LumpIndex {
        &self.primary_index
    }

    #[inline]
    pub fn zip_index(&self) -> &LumpIndex {
        &self.zip_index
    }

    #[inline]
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(&id)
    }

    pub fn loaded_files(&self) -> impl Iterator<Item = &Container> + '_ {
        self.loaded.iter().filter_map(move |id| self.containers.get(id))
    }

    #[inline]
    pub fn loaded_file_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn find(&self, path: &str) -> Option<&Container> {
        if path.is_empty() {
            return None;
        }
        let abs_path = self.absolute_path(path);
        self.loaded_files().find(|container| eq_ignore_case(&container.path, &abs_path))
    }

    pub fn find_all(&self, mut predicate: impl FnMut(&Container) -> bool) -> Vec<&Container> {
        self.loaded_files().filter(|container| predicate(container)).collect()
    }

    /// Checksum of the first loaded non-custom WAD's lump directory, or 0
    /// when no such WAD is loaded. Cached until the loaded files change.
    pub fn loaded_files_crc(&self) -> u32 {
        if let Some(crc) = self.loaded_files_crc.get() {
            return crc;
        }

        let crc = self.loaded_files().find_map(|container| match container.kind {
            ContainerKind::Wad { crc, .. } if !container.custom => Some(crc),
            _ => None,
        });

        match crc {
            Some(crc) => {
                self.loaded_files_crc.set(Some(crc));
                crc
            },
            None => 0,
        }
    }

    pub fn iwad_file_name(&self) -> Option<String> {
        self.loaded_files()
            .find(|container| matches!(container.kind, ContainerKind::Wad { iwad: true, .. }))
            .map(|container| file_name(&container.path).to_uppercase())
    }

    /// File names of every loaded file that is not an IWAD, each followed by
    /// `separator`. GWA companions and the engine's own WAD are left out.
    pub fn pwad_file_names(&self, separator: char) -> String {
        let mut names = String::new();
        for container in self.loaded_files() {
            if matches!(container.kind, ContainerKind::Wad { iwad: true, .. }) {
                continue;
            }
            let name = file_name(&container.path);
            let is_gwa = file_name_extension(name).map_or(false, |ext| eq_ignore_case(ext, GWA_EXTENSION));
            if is_gwa || eq_ignore_case(name, ENGINE_WAD) {
                continue;
            }
            names.push_str(name);
            names.push(separator);
        }
        names
    }

    pub fn check_file_id(&mut self, path: &str) -> bool {
        if !self.access_file(path) {
            return false;
        }
        let abs_path = self.absolute_path(path);
        self.file_ids.check_and_register(&abs_path)
    }

    pub fn release_file_id(&mut self, path: &str) -> bool {
        let abs_path = self.absolute_path(path);
        self.file_ids.release(&abs_path)
    }

    pub fn has_file_id(&self, path: &str) -> bool {
        self.file_ids.contains(&self.absolute_path(path))
    }

    pub fn reset_file_ids(&mut self) {
        self.file_ids.clear();
    }

    #[inline]
    pub fn file_ids(&self) -> &FileIdentityRegistry {
        &self.file_ids
    }

    pub fn add_lump_mapping(&mut self, lump_name: &str, path: &str) -> Result<bool> {
        self.require_active()?;
        if path.is_empty() {
            return Err(Error::illegal_argument("path", path));
        }
        let abs_path = self.absolute_path(path);
        self.mappings.add_lump_mapping(lump_name, &abs_path)
    }

    pub fn add_directory_mapping(&mut self, source: &str, destination: &str) -> Result<bool> {
        self.require_active()?;
        if source.is_empty() {
            return Err(Error::illegal_argument("source", source));
        }
        if destination.is_empty() {
            return Err(Error::illegal_argument("destination", destination));
        }
        let source      = directory_path(&self.absolute_path(source));
        let destination = directory_path(&self.absolute_path(destination));
        self.mappings.add_directory_mapping(&source, &destination)
    }

    pub fn clear_lump_mappings(&mut self) {
        self.mappings.clear_lump_mappings();
    }

    pub fn clear_path_mappings(&mut self) {
        self.mappings.clear_path_mappings();
    }

    #[inline]
    pub fn mappings(&self) -> &PathMappingTables {
        &self.mappings
    }

    /// ZIP entries, lump mapped paths and native files matching `pattern`.
    /// Native results come last, sorted.
    pub fn find_all_paths(&self, pattern: &str) -> Vec<String> {
        if pattern.is_empty() {
            return Vec::new();
        }
        let pattern = self.absolute_path(pattern);
        let mut found = Vec::new();

        for entry in self.zip_index.iter() {
            if match_file_name(&entry.path, &pattern) {
                found.push(entry.path.clone());
            }
        }

        for mapping in self.mappings.lump_mappings() {
            if match_file_name(&mapping.path, &pattern) {
                found.push(mapping.path.clone());
            }
        }

        let search_dir = file_name_path(&pattern);
        if !search_dir.is_empty() {
            let mut native_paths = Vec::new();

            let mapped_dirs = self.mappings.path_mappings().iter()
                .filter_map(|mapping| mapping.apply(search_dir));
            for native_dir in std::iter::once(search_dir.to_owned()).chain(mapped_dirs) {
                let dir = match fs::read_dir(native_path(&native_dir)) {
                    Ok(dir) => dir,
                    Err(error) => {
                        trace!("cannot list {:?}: {}", native_dir, error);
                        continue;
                    },
                };

                for item in dir.flatten() {
                    let name = item.file_name();
                    let name = name.to_string_lossy();
                    let found_path = format!("{}{}", search_dir, name);
                    if match_file_name(&found_path, &pattern) {
                        native_paths.push(found_path);
                    }
                }
            }

            native_paths.sort();
            native_paths.dedup();
            found.extend(native_paths);
        }

        found
    }
}

impl Drop for VirtualFileSystem {
    fn drop(&mut self) {
        if self.state != FsState::Uninitialized && self.state != FsState::ShuttingDown {
            if let Err(error) = self.shutdown() {
                warn!("error while shutting down the file system: {}", error);
            }
        }
    }
}

fn lump_query(name: &str) -> Option<&str> {
    if name.is_empty() {
        return None;
    }
    let query = match file_name_extension(name) {
        Some(ext) if eq_ignore_case(ext, LUMP_EXTENSION) => strip_lump_extension(name),
        _ => name,
    };
    Some(query)
}

fn directory_path(path: &str) -> String {
    if path.ends_with('/') {
        path.to_owned()
    } else {
        format!("{}/", path)
    }
}

fn parse_container(window: &mut Window, abs_path: &str, id: ContainerId, config: &FsConfig) -> Result<(ContainerKind, EntrySet)> {
    let file_type = interpret(abs_path, window)?;

    match file_type {
        FileType::Wad => {
            let wad = Wad::from_reader(window, id)?;
            let kind = ContainerKind::Wad { iwad: wad.is_iwad(), crc: wad.crc() };
            Ok((kind, wad.entries))
        },
        FileType::Zip => {
            let zip = Zip::from_reader(window, id, &config.zip_options())?;
            Ok((ContainerKind::Zip, zip.entries))
        },
        FileType::PlainFile => {
            let mut entries = EntrySet::with_capacity(1);
            entries.push(Entry {
                path:      abs_path.to_owned(),
                container: id,
                index:     0,
                offset:    0,
                size:      window.len(),
                group:     LumpGroup::None,
                crc32:     None,
            });
            Ok((ContainerKind::PlainFile, entries))
        },
    }
}

impl std::fmt::Debug for VirtualFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualFileSystem")
            .field("state", &self.state)
            .field("loaded", &self.loaded.len())
            .field("lumps", &self.primary_index.len())
            .field("open_files", &self.open_files.lock().len())
            .finish()
    }
}
