use std::fmt;

use crate::entry::EntrySet;
use crate::identity::FileId;
use crate::io::Window;

/// Handle of a loaded container. Ids are handed out in load order and never
/// reused, so an id kept past its container's unload resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(pub(crate) u32);

impl ContainerId {
    #[inline]
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("#{}", self.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Wad { iwad: bool, crc: u32 },
    Zip,
    PlainFile,
}

impl ContainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Wad { iwad: true, .. }  => "IWAD",
            ContainerKind::Wad { iwad: false, .. } => "PWAD",
            ContainerKind::Zip                     => "ZIP",
            ContainerKind::PlainFile               => "file",
        }
    }

    #[inline]
    pub fn is_wad(&self) -> bool {
        matches!(self, ContainerKind::Wad { .. })
    }
}

/// A loaded container: its stream, the entries parsed from it and the flags
/// the file system keeps about it.
#[derive(Debug)]
pub struct Container {
    pub(crate) id:      ContainerId,
    pub(crate) path:    String,
    pub(crate) file_id: Option<FileId>,
    pub(crate) kind:    ContainerKind,
    pub(crate) window:  Window,
    pub(crate) entries: EntrySet,
    pub(crate) parent:  Option<ContainerId>,
    pub(crate) startup: bool,
    pub(crate) custom:  bool,
}

impl Container {
    #[inline]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Absolute path the container was loaded from.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Identity registered for this container. `None` when it was loaded as
    /// an allowed duplicate.
    #[inline]
    pub fn file_id(&self) -> Option<&FileId> {
        self.file_id.as_ref()
    }

    #[inline]
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    #[inline]
    pub fn entries(&self) -> &EntrySet {
        &self.entries
    }

    /// Container this one was read from, for containers nested in a ZIP.
    #[inline]
    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    #[inline]
    pub fn is_startup(&self) -> bool {
        self.startup
    }

    #[inline]
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.window.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// A fresh stream over the whole container.
    #[inline]
    pub fn window(&self) -> Window {
        self.window.rewound()
    }
}
