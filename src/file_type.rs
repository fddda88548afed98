use std::io::{Read, Seek, SeekFrom};

use crate::consts::{Magic, IWAD_MAGIC, PWAD_MAGIC, SIG_LOCAL_FILE_HEADER, SIG_END_OF_CENTRAL_DIR};
use crate::util::{eq_ignore_case, file_name_extension};

const WAD_EXTENSIONS: [&str; 2] = ["wad", "gwa"];
const ZIP_EXTENSIONS: [&str; 3] = ["pk3", "zip", "pke"];

/// How the bytes of a loaded file are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Wad,
    Zip,
    PlainFile,
}

impl FileType {
    /// Type implied by the extension of `path`, if it names a container format.
    pub fn from_extension(path: &str) -> Option<FileType> {
        let ext = file_name_extension(path)?;
        if WAD_EXTENSIONS.iter().any(|known| eq_ignore_case(known, ext)) {
            Some(FileType::Wad)
        } else if ZIP_EXTENSIONS.iter().any(|known| eq_ignore_case(known, ext)) {
            Some(FileType::Zip)
        } else {
            None
        }
    }

    /// Type implied by the first bytes of a stream.
    pub fn from_magic(magic: &Magic) -> FileType {
        if *magic == IWAD_MAGIC || *magic == PWAD_MAGIC {
            FileType::Wad
        } else {
            let signature = u32::from_le_bytes(*magic);
            if signature == SIG_LOCAL_FILE_HEADER || signature == SIG_END_OF_CENTRAL_DIR {
                FileType::Zip
            } else {
                FileType::PlainFile
            }
        }
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        *self != FileType::PlainFile
    }
}

/// Decides what `path` is. A known extension wins, otherwise the stream is
/// sniffed. Streams shorter than a magic number are plain files. The stream
/// position is restored to the start.
pub fn interpret<R: Read + Seek>(path: &str, reader: &mut R) -> std::io::Result<FileType> {
    if let Some(file_type) = FileType::from_extension(path) {
        return Ok(file_type);
    }

    reader.seek(SeekFrom::Start(0))?;
    let mut magic: Magic = [0; 4];
    let mut filled = 0;
    while filled < magic.len() {
        let count = reader.read(&mut magic[filled..])?;
        if count == 0 {
            break;
        }
        filled += count;
    }
    reader.seek(SeekFrom::Start(0))?;

    if filled < magic.len() {
        return Ok(FileType::PlainFile);
    }

    Ok(FileType::from_magic(&magic))
}
