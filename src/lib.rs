pub mod check;
pub mod config;
pub mod consts;
pub mod container;
pub mod dump;
pub mod entry;
pub mod file_type;
pub mod handle;
pub mod identity;
pub mod io;
pub mod list;
pub mod lump_index;
pub mod mapping;
pub mod result;
pub mod sort;
pub mod util;
pub mod vfs;
pub mod wad;
pub mod zip;

pub use check::{check, CheckOptions};
pub use config::FsConfig;
pub use container::{Container, ContainerId, ContainerKind};
pub use dump::{dump, DumpOptions};
pub use entry::{Entry, EntrySet, LumpGroup};
pub use file_type::FileType;
pub use handle::{FileHandle, HandleId, OpenMode};
pub use identity::{FileId, FileIdentityRegistry};
pub use io::Window;
pub use list::{list, list_files, ListOptions};
pub use lump_index::LumpIndex;
pub use mapping::{LumpMapping, PathMapping, PathMappingTables};
pub use result::{Error, ErrorKind, FormatError, Result};
pub use vfs::{FsState, VirtualFileSystem};
