use std::io::{Read, Write};

use crc::{crc32, Hasher32};
use tracing::debug;

use crate::consts::BUFFER_SIZE;
use crate::list::select_lumps;
use crate::sort::PHYSICAL_ORDER;
use crate::result::{Result, Error};
use crate::util::format_size;
use crate::vfs::VirtualFileSystem;

/// IEEE CRC-32 of `data`, the checksum ZIP stores per entry.
pub fn crc32_of(data: &[u8]) -> u32 {
    let mut digest = crc32::Digest::new(crc32::IEEE);
    digest.write(data);
    digest.sum32()
}

fn digest_reader(digest: &mut crc32::Digest, reader: &mut impl Read, count: u64) -> std::io::Result<()> {
    let mut buf = [0u8; BUFFER_SIZE];
    let mut remaining = count;

    while remaining >= BUFFER_SIZE as u64 {
        reader.read_exact(&mut buf)?;
        digest.write(&buf);
        remaining -= BUFFER_SIZE as u64;
    }

    if remaining > 0 {
        let buf = &mut buf[..remaining as usize];
        reader.read_exact(buf)?;
        digest.write(buf);
    }

    Ok(())
}

pub struct CheckOptions<'a> {
    pub verbose:        bool,
    pub stop_on_error:  bool,
    pub human_readable: bool,
    pub filter: Option<&'a [&'a str]>,
}

impl CheckOptions<'_> {
    #[inline]
    pub fn new() -> Self {
        CheckOptions::default()
    }
}

impl Default for CheckOptions<'_> {
    #[inline]
    fn default() -> Self {
        Self {
            verbose:        false,
            stop_on_error:  false,
            human_readable: false,
            filter: None,
        }
    }
}

/// Reads every selected lump. Entries of ZIP containers are verified against
/// their stored CRC-32, WAD lumps only have to be readable.
pub fn check(fs: &VirtualFileSystem, options: CheckOptions) -> Result<()> {
    let mut digest = crc32::Digest::new(crc32::IEEE);
    let mut stdout = std::io::stdout();
    let mut failed_lumps_count = 0usize;

    let fmt_size = if options.human_readable {
        |size: u64| format_size(size)
    } else {
        |size: u64| format!("{}", size)
    };

    if options.verbose {
        println!("    File      Offset          Size       CRC32  Path");
    }

    let lumps = select_lumps(fs, options.filter, &PHYSICAL_ORDER)?;

    for (lump_num, entry) in lumps {
        let mut ok = true;
        if options.verbose {
            print!("{:>8}  {:>10}  {:>12}  ", entry.container(), entry.offset(), fmt_size(entry.size()));
            match entry.crc32() {
                Some(crc32) => print!("0x{:08x}", crc32),
                None => print!("         -"),
            }
            print!("  {}... ", entry.path());
            let _ = stdout.flush();
        }

        digest.reset();
        let result = fs.lump_window(lump_num).and_then(|mut window|
            digest_reader(&mut digest, &mut window, entry.size()).map_err(Error::io));

        if let Err(error) = result {
            ok = false;
            if options.verbose {
                print!("FAILED, {}", error);
            } else {
                eprint!("{}: {}", entry.path(), error);
            }
        } else if let Some(expected) = entry.crc32() {
            let sum = digest.sum32();
            if sum != expected {
                ok = false;
                if options.verbose {
                    print!("FAILED, CRC32 sum mismatch, expected: 0x{:08x}, actual: 0x{:08x}",
                        expected, sum);
                } else {
                    eprint!("{}: CRC32 sum mismatch, expected: 0x{:08x}, actual: 0x{:08x}",
                        entry.path(), expected, sum);
                }
            }
        }

        if ok {
            if options.verbose {
                println!("OK");
            }
        } else {
            if options.verbose {
                println!();
            } else {
                eprintln!();
            }
            if options.stop_on_error {
                return Err(Error::other("lump check failed"));
            }
            failed_lumps_count += 1;
        }
    }

    debug!("checked lumps, {} failed", failed_lumps_count);

    if failed_lumps_count == 0 {
        Ok(())
    } else {
        Err(Error::other(format!("check failed for {} lumps", failed_lumps_count)))
    }
}
