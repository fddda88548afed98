use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, warn};

use crate::consts::{Magic, IWAD_MAGIC, PWAD_MAGIC, WAD_HEADER_SIZE, WAD_DIR_ENTRY_SIZE, WAD_LUMP_NAME_SIZE};
use crate::container::ContainerId;
use crate::entry::{Entry, EntrySet, LumpGroup};
use crate::io::{read_i32, stream_len, get_u32};
use crate::result::{Result, Error, FormatError};

const GROUP_MARKERS: [(LumpGroup, &str, &str); 2] = [
    (LumpGroup::Flats,   "F_START", "F_END"),
    (LumpGroup::Sprites, "S_START", "S_END"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WadKind {
    Iwad,
    Pwad,
}

/// A parsed WAD lump directory.
#[derive(Debug)]
pub struct Wad {
    pub(crate) kind:    WadKind,
    pub(crate) entries: EntrySet,
    pub(crate) crc:     u32,
}

impl Wad {
    #[inline]
    pub fn kind(&self) -> WadKind {
        self.kind
    }

    #[inline]
    pub fn is_iwad(&self) -> bool {
        self.kind == WadKind::Iwad
    }

    #[inline]
    pub fn entries(&self) -> &EntrySet {
        &self.entries
    }

    /// Checksum over this WAD's own directory, see [`directory_crc`].
    #[inline]
    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Parses the header and lump directory of the WAD in `reader`.
    ///
    /// Every lump's `offset + size` is checked against the stream length; one
    /// lump pointing past the end fails the whole WAD.
    pub fn from_reader<R: Read + Seek>(reader: &mut R, container: ContainerId) -> Result<Wad> {
        let length = stream_len(reader)?;
        if length < WAD_HEADER_SIZE as u64 {
            return Err(FormatError::Truncated {
                what:      "WAD header",
                needed:    WAD_HEADER_SIZE as u64,
                available: length,
            }.into());
        }

        reader.seek(SeekFrom::Start(0))?;
        let mut magic: Magic = [0; 4];
        reader.read_exact(&mut magic)?;

        let kind = if magic == IWAD_MAGIC {
            WadKind::Iwad
        } else if magic == PWAD_MAGIC {
            WadKind::Pwad
        } else {
            return Err(FormatError::IllegalWadMagic(magic).into());
        };

        let num_lumps    = read_i32(reader)?;
        let table_offset = read_i32(reader)?;

        if num_lumps < 0 {
            return Err(FormatError::IllegalField { field: "lump count", value: num_lumps as i64 }.into());
        }
        if table_offset < 0 {
            return Err(FormatError::IllegalField { field: "directory offset", value: table_offset as i64 }.into());
        }

        let num_lumps    = num_lumps as usize;
        let table_offset = table_offset as u64;
        let table_size   = match (num_lumps as u64).checked_mul(WAD_DIR_ENTRY_SIZE as u64) {
            Some(table_size) => table_size,
            None => return Err(Error::bounds_violation("lump directory", table_offset, u64::MAX, length)),
        };

        if num_lumps > 0 && table_offset.checked_add(table_size).map_or(true, |end| end > length) {
            return Err(Error::bounds_violation("lump directory", table_offset, table_size, length));
        }

        let mut table = vec![0u8; table_size as usize];
        if num_lumps > 0 {
            reader.seek(SeekFrom::Start(table_offset))?;
            reader.read_exact(&mut table)?;
        }

        let mut entries = EntrySet::with_capacity(num_lumps);
        let mut crc = 0u32;
        let mut group: Option<(LumpGroup, &str)> = None;

        for (index, record) in table.chunks_exact(WAD_DIR_ENTRY_SIZE).enumerate() {
            let file_pos = get_u32(record, 0) as i32;
            let size     = get_u32(record, 4) as i32;
            let raw_name = lump_name_bytes(&record[8..8 + WAD_LUMP_NAME_SIZE]);
            let name = lump_name(&raw_name);

            if file_pos < 0 {
                return Err(FormatError::IllegalField { field: "lump offset", value: file_pos as i64 }.into());
            }
            if size < 0 {
                return Err(FormatError::IllegalField { field: "lump size", value: size as i64 }.into());
            }

            let offset = file_pos as u64;
            let size   = size as u64;
            if offset + size > length {
                return Err(Error::bounds_violation(&name, offset, size, length));
            }

            crc = crc.wrapping_add(size as u32);
            crc = raw_name.iter().fold(crc, |crc, byte| crc.wrapping_add(*byte as i8 as i32 as u32));

            let lump_group = match group {
                None => {
                    if let Some((start_group, _)) = marker_for_group(&name, true) {
                        group = Some((start_group, marker_end(start_group)));
                    }
                    LumpGroup::None
                },
                Some((inside, _)) => {
                    if marker_for_group(&name, false).map(|(group, _)| group) == Some(inside) {
                        group = None;
                        LumpGroup::None
                    } else {
                        inside
                    }
                },
            };

            entries.push(Entry {
                path:      name,
                container,
                index,
                offset,
                size,
                group:     lump_group,
                crc32:     None,
            });
        }

        if let Some((inside, end)) = group {
            warn!("{} group is not closed by {}", inside.name(), end);
        }

        debug!("parsed {:?} with {} lumps", kind, entries.len());

        Ok(Wad {
            kind,
            entries,
            crc,
        })
    }
}

/// Copies a directory name field up to its first NUL. The bytes after it are
/// zeroed, so names with garbage after the terminator compare and checksum alike.
fn lump_name_bytes(field: &[u8]) -> [u8; WAD_LUMP_NAME_SIZE] {
    let mut name = [0u8; WAD_LUMP_NAME_SIZE];
    for (dest, byte) in name.iter_mut().zip(field.iter().take_while(|byte| **byte != 0)) {
        *dest = *byte;
    }
    name
}

fn lump_name(raw: &[u8; WAD_LUMP_NAME_SIZE]) -> String {
    raw.iter().take_while(|byte| **byte != 0).map(|byte| *byte as char).collect()
}

/// Group whose start (or end) marker `name` is. A marker also matches when it
/// carries one extra leading character, as in `FF_START` or `SS_END`.
fn marker_for_group(name: &str, begin: bool) -> Option<(LumpGroup, &'static str)> {
    for (group, start, end) in GROUP_MARKERS.iter() {
        let marker = if begin { *start } else { *end };
        if name.eq_ignore_ascii_case(marker) ||
           (name.len() == marker.len() + 1 && name.is_char_boundary(1) && name[1..].eq_ignore_ascii_case(marker)) {
            return Some((*group, marker));
        }
    }
    None
}

fn marker_end(group: LumpGroup) -> &'static str {
    GROUP_MARKERS.iter()
        .find(|(marker_group, _, _)| *marker_group == group)
        .map(|(_, _, end)| *end)
        .unwrap_or("")
}

/// The WAD directory checksum: the wrapping sum of every lump's size and of
/// each of its eight name bytes taken as signed chars.
pub fn directory_crc<'a>(lumps: impl IntoIterator<Item = (&'a str, u64)>) -> u32 {
    let mut crc = 0u32;
    for (name, size) in lumps {
        let mut field = [0u8; WAD_LUMP_NAME_SIZE];
        for (dest, byte) in field.iter_mut().zip(name.bytes()) {
            *dest = byte;
        }
        crc = crc.wrapping_add(size as u32);
        crc = field.iter().fold(crc, |crc, byte| crc.wrapping_add(*byte as i8 as i32 as u32));
    }
    crc
}
