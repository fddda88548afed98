use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, trace};

use crate::consts::{
    SIG_LOCAL_FILE_HEADER, SIG_CENTRAL_FILE_HEADER, SIG_END_OF_CENTRAL_DIR,
    CENTRAL_END_SIZE, CENTRAL_FILE_HEADER_SIZE, LOCAL_FILE_HEADER_SIZE,
    DEFAULT_MAX_COMMENT_SIZE, MAX_ENTRY_NAME_SIZE, ZFH_ENCRYPTED, ZFC_NO_COMPRESSION,
};
use crate::container::ContainerId;
use crate::entry::{Entry, EntrySet, LumpGroup};
use crate::io::{get_u16, get_u32, stream_len};
use crate::result::{Result, Error, FormatError, Unsupported};
use crate::util::make_absolute;

#[derive(Debug, Clone)]
pub struct ZipOptions {
    /// Base that relative entry names are made absolute against.
    pub base_path: String,
    /// How far from the end of the stream the end of central directory
    /// record is searched for.
    pub max_comment_size: u64,
}

impl Default for ZipOptions {
    fn default() -> Self {
        ZipOptions {
            base_path:        "/".to_owned(),
            max_comment_size: DEFAULT_MAX_COMMENT_SIZE,
        }
    }
}

/// End of central directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralEnd {
    pub disk_entry_count:  u16,
    pub total_entry_count: u16,
    pub size:              u32,
    pub offset:            u32,
}

/// A parsed ZIP central directory. Only stored, unencrypted, single disk
/// archives are accepted.
#[derive(Debug)]
pub struct Zip {
    pub(crate) entries: EntrySet,
}

impl Zip {
    #[inline]
    pub fn entries(&self) -> &EntrySet {
        &self.entries
    }

    pub fn from_reader<R: Read + Seek>(reader: &mut R, container: ContainerId, options: &ZipOptions) -> Result<Zip> {
        let length = stream_len(reader)?;
        let (end_offset, end) = locate_central_directory(reader, length, options.max_comment_size)?;

        trace!("central directory end at {}: {:?}", end_offset, end);

        if end.disk_entry_count != end.total_entry_count {
            return Err(FormatError::MultiDisk {
                disk_entries:  end.disk_entry_count,
                total_entries: end.total_entry_count,
            }.into());
        }

        let dir_offset = end.offset as u64;
        let dir_size   = end.size as u64;
        if dir_offset + dir_size > length {
            return Err(Error::bounds_violation("central directory", dir_offset, dir_size, length));
        }

        let mut directory = vec![0u8; dir_size as usize];
        reader.seek(SeekFrom::Start(dir_offset))?;
        reader.read_exact(&mut directory)?;

        let mut entries = EntrySet::with_capacity(end.total_entry_count as usize);
        let mut pos = 0usize;

        for index in 0..end.total_entry_count as usize {
            if pos + CENTRAL_FILE_HEADER_SIZE > directory.len() {
                return Err(FormatError::Truncated {
                    what:      "central directory",
                    needed:    (pos + CENTRAL_FILE_HEADER_SIZE) as u64,
                    available: directory.len() as u64,
                }.into());
            }

            let header = &directory[pos..pos + CENTRAL_FILE_HEADER_SIZE];
            let signature = get_u32(header, 0);
            if signature != SIG_CENTRAL_FILE_HEADER {
                return Err(FormatError::IllegalSignature {
                    expected: SIG_CENTRAL_FILE_HEADER,
                    actual:   signature,
                    offset:   dir_offset + pos as u64,
                }.into());
            }

            let flags           = get_u16(header, 8);
            let compression     = get_u16(header, 10);
            let crc32           = get_u32(header, 16);
            let compressed_size = get_u32(header, 20);
            let size            = get_u32(header, 24);
            let name_size       = get_u16(header, 28) as usize;
            let extra_size      = get_u16(header, 30) as usize;
            let comment_size    = get_u16(header, 32) as usize;
            let rel_offset      = get_u32(header, 42) as u64;

            let name_start = pos + CENTRAL_FILE_HEADER_SIZE;
            let record_end = name_start + name_size + extra_size + comment_size;
            if record_end > directory.len() {
                return Err(FormatError::Truncated {
                    what:      "central file header",
                    needed:    record_end as u64,
                    available: directory.len() as u64,
                }.into());
            }

            let name_field = &directory[name_start..name_start + name_size];
            let name_field = match name_field.iter().position(|byte| *byte == 0) {
                Some(nul) => &name_field[..nul],
                None => name_field,
            };
            let raw_name = String::from_utf8_lossy(name_field).into_owned();
            pos = record_end;

            if name_size > MAX_ENTRY_NAME_SIZE {
                return Err(FormatError::NameTooLong {
                    name:   raw_name,
                    length: name_size,
                }.into());
            }

            // directories
            if raw_name.ends_with('/') && size == 0 {
                continue;
            }

            if compression != ZFC_NO_COMPRESSION {
                return Err(Error::unsupported_entry(&raw_name, Unsupported::Compressed(compression)));
            }
            if compressed_size != size {
                return Err(Error::unsupported_entry(&raw_name, Unsupported::SizeMismatch { compressed_size, size }));
            }
            if flags & ZFH_ENCRYPTED != 0 {
                return Err(Error::unsupported_entry(&raw_name, Unsupported::Encrypted));
            }

            let offset = data_offset(reader, &raw_name, rel_offset, length)?;
            let size = size as u64;
            if offset + size > length {
                return Err(Error::bounds_violation(&raw_name, offset, size, length));
            }

            entries.push(Entry {
                path:      make_absolute(&options.base_path, &raw_name),
                container,
                index,
                offset,
                size,
                group:     LumpGroup::None,
                crc32:     Some(crc32),
            });
        }

        entries.sort_by_path();

        debug!("parsed ZIP central directory with {} entries", entries.len());

        Ok(Zip { entries })
    }
}

/// Scans backward from `length - 22` for the end of central directory
/// signature, no further than `max_comment_size` bytes from the end.
pub fn locate_central_directory<R: Read + Seek>(reader: &mut R, length: u64, max_comment_size: u64) -> Result<(u64, CentralEnd)> {
    let not_found = || Error::format(FormatError::CentralDirectoryNotFound(max_comment_size));

    if length < CENTRAL_END_SIZE as u64 {
        return Err(not_found());
    }

    let tail_size = length.min(max_comment_size.max(CENTRAL_END_SIZE as u64));
    let tail_start = length - tail_size;
    let mut tail = vec![0u8; tail_size as usize];
    reader.seek(SeekFrom::Start(tail_start))?;
    reader.read_exact(&mut tail)?;

    let mut back = CENTRAL_END_SIZE as u64;
    while back <= tail_size && back < max_comment_size.max(CENTRAL_END_SIZE as u64 + 1) {
        let pos = (tail_size - back) as usize;
        if get_u32(&tail, pos) == SIG_END_OF_CENTRAL_DIR {
            let record = &tail[pos..pos + CENTRAL_END_SIZE];
            let end = CentralEnd {
                disk_entry_count:  get_u16(record, 8),
                total_entry_count: get_u16(record, 10),
                size:              get_u32(record, 12),
                offset:            get_u32(record, 16),
            };
            return Ok((tail_start + pos as u64, end));
        }
        back += 1;
    }

    Err(not_found())
}

/// Start of an entry's data, read from its local file header.
fn data_offset<R: Read + Seek>(reader: &mut R, name: &str, rel_offset: u64, length: u64) -> Result<u64> {
    let header_size = LOCAL_FILE_HEADER_SIZE as u64;
    if rel_offset + header_size > length {
        return Err(Error::bounds_violation(name, rel_offset, header_size, length));
    }

    let mut header = [0u8; LOCAL_FILE_HEADER_SIZE];
    reader.seek(SeekFrom::Start(rel_offset))?;
    reader.read_exact(&mut header)?;

    let signature = get_u32(&header, 0);
    if signature != SIG_LOCAL_FILE_HEADER {
        return Err(FormatError::IllegalSignature {
            expected: SIG_LOCAL_FILE_HEADER,
            actual:   signature,
            offset:   rel_offset,
        }.into());
    }

    let name_size  = get_u16(&header, 26) as u64;
    let extra_size = get_u16(&header, 28) as u64;

    Ok(rel_offset + header_size + name_size + extra_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::result::ErrorKind;

    struct Member<'a> {
        name:        &'a str,
        data:        &'a [u8],
        compression: u16,
        flags:       u16,
    }

    fn stored<'a>(name: &'a str, data: &'a [u8]) -> Member<'a> {
        Member { name, data, compression: 0, flags: 0 }
    }

    fn build_zip(members: &[Member], comment: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        let mut central = Vec::new();

        for member in members {
            let offset = data.len() as u32;
            let crc = crate::check::crc32_of(member.data);

            data.extend_from_slice(&SIG_LOCAL_FILE_HEADER.to_le_bytes());
            data.extend_from_slice(&20u16.to_le_bytes());
            data.extend_from_slice(&member.flags.to_le_bytes());
            data.extend_from_slice(&member.compression.to_le_bytes());
            data.extend_from_slice(&[0; 4]);
            data.extend_from_slice(&crc.to_le_bytes());
            data.extend_from_slice(&(member.data.len() as u32).to_le_bytes());
            data.extend_from_slice(&(member.data.len() as u32).to_le_bytes());
            data.extend_from_slice(&(member.name.len() as u16).to_le_bytes());
            data.extend_from_slice(&3u16.to_le_bytes());
            data.extend_from_slice(member.name.as_bytes());
            data.extend_from_slice(b"xyz");
            data.extend_from_slice(member.data);

            central.extend_from_slice(&SIG_CENTRAL_FILE_HEADER.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&member.flags.to_le_bytes());
            central.extend_from_slice(&member.compression.to_le_bytes());
            central.extend_from_slice(&[0; 4]);
            central.extend_from_slice(&crc.to_le_bytes());
            central.extend_from_slice(&(member.data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(member.data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(member.name.len() as u16).to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&[0; 8]);
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(member.name.as_bytes());
        }

        let central_offset = data.len() as u32;
        data.extend_from_slice(&central);
        data.extend_from_slice(&SIG_END_OF_CENTRAL_DIR.to_le_bytes());
        data.extend_from_slice(&[0; 4]);
        data.extend_from_slice(&(members.len() as u16).to_le_bytes());
        data.extend_from_slice(&(members.len() as u16).to_le_bytes());
        data.extend_from_slice(&(central.len() as u32).to_le_bytes());
        data.extend_from_slice(&central_offset.to_le_bytes());
        data.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        data.extend_from_slice(comment);
        data
    }

    fn parse(data: Vec<u8>) -> Result<Zip> {
        Zip::from_reader(&mut Cursor::new(data), ContainerId(3), &ZipOptions::default())
    }

    #[test]
    fn single_stored_entry() {
        let zip = parse(build_zip(&[stored("foo.txt", b"hello")], b"")).unwrap();
        assert_eq!(zip.entries().len(), 1);

        let entry = zip.entries().get(0).unwrap();
        assert_eq!(entry.path(), "/foo.txt");
        assert_eq!(entry.size(), 5);
        assert_eq!(entry.offset(), 30 + 7 + 3);
        assert_eq!(entry.container(), ContainerId(3));
        assert_eq!(entry.crc32(), Some(crate::check::crc32_of(b"hello")));
    }

    #[test]
    fn entries_are_sorted_and_absolute() {
        let options = ZipOptions { base_path: "/games/doom".to_owned(), ..ZipOptions::default() };
        let data = build_zip(&[
            stored("textures\\Wall.png", b"w"),
            stored("data/", b""),
            stored("Data/b.lmp", b"bb"),
            stored("data/a.lmp", b"a"),
        ], b"some comment");
        let zip = Zip::from_reader(&mut Cursor::new(data), ContainerId(1), &options).unwrap();

        let paths: Vec<_> = zip.entries().iter().map(|entry| entry.path()).collect();
        assert_eq!(paths, ["/games/doom/data/a.lmp", "/games/doom/Data/b.lmp", "/games/doom/textures/Wall.png"]);
        assert_eq!(zip.entries().find("/GAMES/doom/textures/wall.png"), Some(2));
    }

    #[test]
    fn empty_archive() {
        let zip = parse(build_zip(&[], b"")).unwrap();
        assert!(zip.entries().is_empty());
    }

    #[test]
    fn missing_end_record_is_format_error() {
        let mut data = build_zip(&[stored("foo.txt", b"hello")], b"");
        data.extend(std::iter::repeat(0u8).take(4096));
        let error = parse(data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);

        let error = parse(b"PK".to_vec()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);

        let error = parse(vec![0u8; 3000]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);
    }

    #[test]
    fn long_comment_within_limit() {
        let comment = vec![b'c'; 1500];
        let zip = parse(build_zip(&[stored("foo.txt", b"hello")], &comment)).unwrap();
        assert_eq!(zip.entries().len(), 1);
    }

    #[test]
    fn end_record_at_scan_limit() {
        // the record may start at most 2047 bytes before the end
        let comment = vec![b'c'; DEFAULT_MAX_COMMENT_SIZE as usize - 1 - CENTRAL_END_SIZE];
        let zip = parse(build_zip(&[stored("foo.txt", b"hello")], &comment)).unwrap();
        assert_eq!(zip.entries().len(), 1);

        let comment = vec![b'c'; DEFAULT_MAX_COMMENT_SIZE as usize - CENTRAL_END_SIZE];
        let error = parse(build_zip(&[stored("foo.txt", b"hello")], &comment)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);
    }

    #[test]
    fn names_end_at_nul() {
        let zip = parse(build_zip(&[stored("foo\0bar.txt", b"hello")], b"")).unwrap();
        assert_eq!(zip.entries().get(0).unwrap().path(), "/foo");
    }

    #[test]
    fn rejects_multi_disk() {
        let mut data = build_zip(&[stored("foo.txt", b"hello")], b"");
        let end = data.len() - CENTRAL_END_SIZE;
        data[end + 8..end + 10].copy_from_slice(&0u16.to_le_bytes());
        let error = parse(data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);
        assert!(error.to_string().contains("multi-disk"));
    }

    #[test]
    fn rejects_compressed_entry() {
        let data = build_zip(&[stored("a.txt", b"a"), Member { name: "maps/map01.wad", data: b"zz", compression: 8, flags: 0 }], b"");
        let error = parse(data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnsupportedEntry);
        assert!(error.to_string().contains("maps/map01.wad"));
    }

    #[test]
    fn rejects_encrypted_entry() {
        let data = build_zip(&[Member { name: "secret.txt", data: b"zz", compression: 0, flags: ZFH_ENCRYPTED }], b"");
        let error = parse(data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnsupportedEntry);
        assert!(error.to_string().contains("encrypted"));
    }

    #[test]
    fn rejects_directory_past_end() {
        let mut data = build_zip(&[stored("foo.txt", b"hello")], b"");
        let end = data.len() - CENTRAL_END_SIZE;
        data[end + 12..end + 16].copy_from_slice(&10_000u32.to_le_bytes());
        let error = parse(data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BoundsViolation);
    }

    #[test]
    fn rejects_entry_past_end() {
        let mut data = build_zip(&[stored("foo.txt", b"hello")], b"");
        let end = data.len() - CENTRAL_END_SIZE;
        let central = get_u32(&data, end + 16) as usize;
        data[central + 20..central + 24].copy_from_slice(&1_000_000u32.to_le_bytes());
        data[central + 24..central + 28].copy_from_slice(&1_000_000u32.to_le_bytes());
        let error = parse(data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BoundsViolation);
    }

    #[test]
    fn rejects_bad_central_signature() {
        let mut data = build_zip(&[stored("foo.txt", b"hello")], b"");
        let end = data.len() - CENTRAL_END_SIZE;
        let central = get_u32(&data, end + 16) as usize;
        data[central] = 0;
        let error = parse(data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);
    }
}
