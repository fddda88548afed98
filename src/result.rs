use std::path::{PathBuf, Path};

use thiserror::Error as ThisError;

use crate::consts::Magic;

/// Structural reasons a container header or directory is rejected.
#[derive(Debug, ThisError)]
pub enum FormatError {
    #[error("illegal WAD identification: {} (expected IWAD or PWAD)", format_magic(.0))]
    IllegalWadMagic(Magic),

    #[error("central directory not found within the last {0} bytes")]
    CentralDirectoryNotFound(u64),

    #[error("multi-disk ZIP archives are not supported ({disk_entries} entries on this disk, {total_entries} in total)")]
    MultiDisk { disk_entries: u16, total_entries: u16 },

    #[error("illegal signature 0x{actual:08x} at offset {offset}, expected 0x{expected:08x}")]
    IllegalSignature { expected: u32, actual: u32, offset: u64 },

    #[error("truncated {what}: need {needed} bytes, only {available} available")]
    Truncated { what: &'static str, needed: u64, available: u64 },

    #[error("entry name too long ({length} bytes): {name:?}")]
    NameTooLong { name: String, length: usize },

    #[error("illegal {field}: {value}")]
    IllegalField { field: &'static str, value: i64 },
}

fn format_magic(magic: &Magic) -> String {
    format!("{:02X} {:02X} {:02X} {:02X}", magic[0], magic[1], magic[2], magic[3])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    Compressed(u16),
    SizeMismatch { compressed_size: u32, size: u32 },
    Encrypted,
}

impl std::fmt::Display for Unsupported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unsupported::Compressed(method) => write!(f, "is compressed (method {}), compression is not supported", method),
            Unsupported::SizeMismatch { compressed_size, size } =>
                write!(f, "is compressed ({} of {} bytes stored), compression is not supported", compressed_size, size),
            Unsupported::Encrypted => write!(f, "is encrypted, encryption is not supported"),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum ErrorType {
    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("not found: {0:?}")]
    NotFound(String),

    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("{name:?} {reason}")]
    UnsupportedEntry { name: String, reason: Unsupported },

    #[error("already loaded: {0:?}")]
    DuplicateLoad(String),

    #[error("{name:?}: {size} bytes at offset {offset} exceed the stream length of {length} bytes")]
    BoundsViolation { name: String, offset: u64, size: u64, length: u64 },

    #[error("illegal argument for {name}: {value:?}")]
    IllegalArgument { name: &'static str, value: String },

    #[error("operation not allowed while the file system is {0}")]
    InvalidState(&'static str),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`], one value per failure class callers
/// are expected to react to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Format,
    UnsupportedEntry,
    DuplicateLoad,
    BoundsViolation,
    Other,
}

impl ErrorKind {
    /// Whether the caller may go on with its next fallback after this failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorKind::NotFound | ErrorKind::DuplicateLoad)
    }
}

#[derive(Debug)]
pub struct Error {
    pub(crate) error_type: ErrorType,
    pub(crate) path:       Option<PathBuf>,
}

impl Error {
    #[inline]
    pub fn new(error_type: ErrorType, path: Option<PathBuf>) -> Self {
        Error {
            path,
            error_type,
        }
    }

    #[inline]
    pub fn error_type(&self) -> &ErrorType {
        &self.error_type
    }

    #[inline]
    pub fn path(&self) -> &Option<PathBuf> {
        &self.path
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.error_type {
            ErrorType::NotFound(_)                => ErrorKind::NotFound,
            ErrorType::IO(err) if err.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            ErrorType::Format(_)                  => ErrorKind::Format,
            ErrorType::UnsupportedEntry { .. }    => ErrorKind::UnsupportedEntry,
            ErrorType::DuplicateLoad(_)           => ErrorKind::DuplicateLoad,
            ErrorType::BoundsViolation { .. }     => ErrorKind::BoundsViolation,
            _                                     => ErrorKind::Other,
        }
    }

    #[inline]
    pub fn with_path(self, path: impl AsRef<Path>) -> Self {
        Error {
            path:       Some(path.as_ref().to_path_buf()),
            error_type: self.error_type,
        }
    }

    /// Attaches `path` unless a more specific path is already attached.
    #[inline]
    pub fn or_path(self, path: impl AsRef<Path>) -> Self {
        if self.path.is_none() {
            self.with_path(path)
        } else {
            self
        }
    }

    #[inline]
    pub fn io_with_path(error: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error {
            path:       Some(path.as_ref().to_path_buf()),
            error_type: ErrorType::IO(error),
        }
    }

    #[inline]
    pub fn io(error: std::io::Error) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::IO(error),
        }
    }

    #[inline]
    pub fn other(message: impl AsRef<str>) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::Other(message.as_ref().to_owned()),
        }
    }

    #[inline]
    pub fn not_found(path: impl AsRef<str>) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::NotFound(path.as_ref().to_owned()),
        }
    }

    #[inline]
    pub fn format(error: FormatError) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::Format(error),
        }
    }

    #[inline]
    pub fn unsupported_entry(name: impl AsRef<str>, reason: Unsupported) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::UnsupportedEntry {
                name: name.as_ref().to_owned(),
                reason,
            },
        }
    }

    #[inline]
    pub fn duplicate_load(path: impl AsRef<str>) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::DuplicateLoad(path.as_ref().to_owned()),
        }
    }

    #[inline]
    pub fn bounds_violation(name: impl AsRef<str>, offset: u64, size: u64, length: u64) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::BoundsViolation {
                name: name.as_ref().to_owned(),
                offset,
                size,
                length,
            },
        }
    }

    #[inline]
    pub fn illegal_argument(name: &'static str, value: impl AsRef<str>) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::IllegalArgument {
                name,
                value: value.as_ref().to_owned(),
            },
        }
    }

    #[inline]
    pub fn invalid_state(state: &'static str) -> Self {
        Error {
            path:       None,
            error_type: ErrorType::InvalidState(state),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{:?}: {}", path, self.error_type)
        } else {
            self.error_type.fmt(f)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error_type)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error {
            error_type: ErrorType::IO(error),
            path: None,
        }
    }
}

impl From<FormatError> for Error {
    fn from(error: FormatError) -> Self {
        Error::format(error)
    }
}

impl From<clap::Error> for Error {
    fn from(error: clap::Error) -> Self {
        Error::other(error.message)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
