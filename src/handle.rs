use std::convert::TryFrom;
use std::fs;
use std::io::{Read, Write, Seek, SeekFrom};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::container::ContainerId;
use crate::entry::Entry;
use crate::io::Window;
use crate::result::{Result, Error};

/// How a path is opened: `r`/`w` pick the direction, `b`/`t` binary or text
/// (kept for callers, no translation is done) and `f` skips the containers
/// and only looks at native files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    pub write:       bool,
    pub binary:      bool,
    pub native_only: bool,
}

impl OpenMode {
    pub const READ: OpenMode = OpenMode {
        write:       false,
        binary:      true,
        native_only: false,
    };

    #[inline]
    pub fn is_read(&self) -> bool {
        !self.write
    }
}

impl Default for OpenMode {
    #[inline]
    fn default() -> Self {
        OpenMode::READ
    }
}

impl TryFrom<&str> for OpenMode {
    type Error = Error;

    fn try_from(value: &str) -> Result<OpenMode> {
        let mut mode = OpenMode {
            write:       false,
            binary:      false,
            native_only: false,
        };
        let mut read = false;

        for ch in value.chars() {
            match ch {
                'r' => read = true,
                'w' => mode.write = true,
                'b' => mode.binary = true,
                't' => mode.binary = false,
                'f' => mode.native_only = true,
                _ => return Err(Error::illegal_argument("mode", value)),
            }
        }

        if read && mode.write {
            return Err(Error::illegal_argument("mode", value));
        }

        Ok(mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(pub(crate) u64);

#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenRecord {
    pub(crate) handle:    HandleId,
    pub(crate) container: Option<ContainerId>,
}

/// Records of the handles that are still open. Shared with the handles so a
/// dropped handle takes its record with it.
pub(crate) type OpenFiles = Arc<Mutex<Vec<OpenRecord>>>;

#[derive(Debug)]
enum Stream {
    Read(Window),
    Write(fs::File),
}

/// An open file: a lump inside a container or a native file.
#[derive(Debug)]
pub struct FileHandle {
    pub(crate) id:        HandleId,
    pub(crate) path:      String,
    pub(crate) container: Option<ContainerId>,
    pub(crate) entry:     Option<Arc<Entry>>,
    stream:               Stream,
    open_files:           Weak<Mutex<Vec<OpenRecord>>>,
}

impl FileHandle {
    pub(crate) fn for_read(id: HandleId, path: String, container: Option<ContainerId>, entry: Option<Arc<Entry>>, window: Window) -> Self {
        FileHandle {
            id,
            path,
            container,
            entry,
            stream:     Stream::Read(window),
            open_files: Weak::new(),
        }
    }

    pub(crate) fn for_write(id: HandleId, path: String, file: fs::File) -> Self {
        FileHandle {
            id,
            path,
            container: None,
            entry:      None,
            stream:     Stream::Write(file),
            open_files: Weak::new(),
        }
    }

    pub(crate) fn register(mut self, open_files: &OpenFiles) -> Self {
        open_files.lock().push(OpenRecord {
            handle:    self.id,
            container: self.container,
        });
        self.open_files = Arc::downgrade(open_files);
        self
    }

    #[inline]
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Absolute path the handle was resolved to.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Container supplying the bytes, `None` for native files.
    #[inline]
    pub fn container(&self) -> Option<ContainerId> {
        self.container
    }

    #[inline]
    pub fn entry(&self) -> Option<&Arc<Entry>> {
        self.entry.as_ref()
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        matches!(self.stream, Stream::Write(_))
    }

    pub fn length(&self) -> Result<u64> {
        match &self.stream {
            Stream::Read(window) => Ok(window.len()),
            Stream::Write(file)  => Ok(file.metadata()?.len()),
        }
    }

    /// Reads everything from the current position to the end.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.read_to_end(&mut data)
            .map_err(|error| Error::io(error).with_path(&self.path))?;
        Ok(data)
    }

    /// The window over the handle's bytes, for handles opened for reading.
    pub fn window_mut(&mut self) -> Option<&mut Window> {
        match &mut self.stream {
            Stream::Read(window) => Some(window),
            Stream::Write(_)     => None,
        }
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if let Some(open_files) = self.open_files.upgrade() {
            open_files.lock().retain(|record| record.handle != self.id);
        }
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.stream {
            Stream::Read(window) => window.read(buf),
            Stream::Write(_) => Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied,
                "file handle is open for writing")),
        }
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.stream {
            Stream::Write(file) => file.write(buf),
            Stream::Read(_) => Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied,
                "file handle is open for reading")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.stream {
            Stream::Write(file) => file.flush(),
            Stream::Read(_)     => Ok(()),
        }
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match &mut self.stream {
            Stream::Read(window) => window.seek(pos),
            Stream::Write(file)  => file.seek(pos),
        }
    }
}
