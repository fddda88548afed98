use std::path::{Path, PathBuf};
use std::io::{Read, Write};
use std::fs;

use crc::{crc32, Hasher32};
use tracing::info;

use crate::consts::{BUFFER_SIZE, LUMP_EXTENSION};
use crate::entry::Entry;
use crate::list::select_lumps;
use crate::sort::DEFAULT_ORDER;
use crate::result::{Result, Error};
use crate::util::{file_name_extension, is_absolute, split_path};
use crate::vfs::VirtualFileSystem;

pub struct DumpOptions<'a> {
    pub filter: Option<&'a [&'a str]>,
    pub verbose: bool,
    pub check: bool,
}

impl DumpOptions<'_> {
    #[inline]
    pub fn new() -> Self {
        DumpOptions::default()
    }
}

impl Default for DumpOptions<'_> {
    #[inline]
    fn default() -> Self {
        Self {
            filter: None,
            verbose: false,
            check: false,
        }
    }
}

/// Where `entry` is written below `outdir`: ZIP paths keep their directories
/// relative to the root, WAD lumps get a `.lmp` extension.
pub fn dump_path(outdir: impl AsRef<Path>, entry: &Entry) -> PathBuf {
    let mut outpath = outdir.as_ref().to_path_buf();
    for (_, item, _) in split_path(entry.path()) {
        if item == ".." || item.ends_with(':') {
            continue;
        }
        outpath.push(item);
    }

    if !is_absolute(entry.path()) && file_name_extension(entry.path()).is_none() {
        outpath.set_extension(LUMP_EXTENSION);
    }

    outpath
}

/// Writes the selected lumps below `outdir` in load order, so that a lump
/// overriding another with the same path ends up on disk.
pub fn dump(fs: &VirtualFileSystem, outdir: impl AsRef<Path>, options: DumpOptions) -> Result<usize> {
    let mut digest = crc32::Digest::new(crc32::IEEE);
    let lumps = select_lumps(fs, options.filter, &DEFAULT_ORDER)?;
    let mut count = 0usize;

    for (lump_num, entry) in lumps {
        let outpath = dump_path(&outdir, entry);
        if options.verbose {
            println!("writing {:?}", outpath);
        }

        if let Some(parent) = outpath.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                return Err(Error::io_with_path(error, parent));
            }
        }

        let mut window = fs.lump_window(lump_num)?;
        let mut writer = match fs::File::create(&outpath) {
            Ok(writer) => writer,
            Err(error) => return Err(Error::io_with_path(error, outpath)),
        };

        match (options.check, entry.crc32()) {
            (true, Some(expected)) => {
                digest.reset();
                let mut buf = vec![0u8; BUFFER_SIZE.min(entry.size() as usize).max(1)];
                loop {
                    let count = window.read(&mut buf).map_err(|error| Error::io_with_path(error, entry.path()))?;
                    if count == 0 {
                        break;
                    }
                    let data = &buf[..count];
                    if let Err(error) = writer.write_all(data) {
                        return Err(Error::io_with_path(error, outpath));
                    }
                    digest.write(data);
                }

                let sum = digest.sum32();
                if sum != expected {
                    return Err(Error::other(format!("{}: CRC32 sum mismatch, expected: 0x{:08x}, actual: 0x{:08x}",
                        entry.path(), expected, sum)));
                }
            },
            _ => {
                if let Err(error) = window.transfer_to(&mut writer, entry.size()) {
                    return Err(Error::io_with_path(error, outpath));
                }
            }
        }

        count += 1;
    }

    info!("dumped {} lumps to {:?}", count, outdir.as_ref());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerId;
    use crate::entry::LumpGroup;

    fn entry(path: &str) -> Entry {
        Entry {
            path: path.to_owned(),
            container: ContainerId(1),
            index: 0,
            offset: 0,
            size: 0,
            group: LumpGroup::None,
            crc32: None,
        }
    }

    #[test]
    fn output_paths() {
        assert_eq!(dump_path("/out", &entry("/games/doom/data/foo.txt")), Path::new("/out/games/doom/data/foo.txt"));
        assert_eq!(dump_path("/out", &entry("C:/data/foo.txt")), Path::new("/out/data/foo.txt"));
        assert_eq!(dump_path("/out", &entry("PLAYPAL")), Path::new("/out/PLAYPAL.lmp"));
    }
}
