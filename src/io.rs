use std::fs;
use std::io::{Read, SeekFrom, Seek};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::result::{Result, Error};

pub type SharedFile = Arc<Mutex<fs::File>>;

#[inline]
pub(crate) fn read_i32(file: &mut impl Read) -> std::io::Result<i32> {
    let mut buffer = [0; 4];
    file.read_exact(&mut buffer)?;

    Ok(i32::from_le_bytes(buffer))
}

#[inline]
pub(crate) fn get_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

#[inline]
pub(crate) fn get_u32(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buffer[offset], buffer[offset + 1], buffer[offset + 2], buffer[offset + 3]])
}

pub(crate) fn stream_len(file: &mut impl Seek) -> std::io::Result<u64> {
    let pos = file.seek(SeekFrom::Current(0))?;
    let len = file.seek(SeekFrom::End(0))?;
    if pos != len {
        file.seek(SeekFrom::Start(pos))?;
    }
    Ok(len)
}

/// A bounded, independently positioned view into a shared file. Each read
/// locks the file, seeks to the absolute position and reads.
#[derive(Clone, Debug)]
pub struct Window {
    file: SharedFile,
    base: u64,
    len:  u64,
    pos:  u64,
}

impl Window {
    pub fn open(path: impl AsRef<Path>) -> Result<Window> {
        let path = path.as_ref();
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(Error::io_with_path(error, path)),
        };

        Self::from_file(file).map_err(|error| error.or_path(path))
    }

    pub fn from_file(file: fs::File) -> Result<Window> {
        let len = file.metadata()?.len();

        Ok(Window {
            file: Arc::new(Mutex::new(file)),
            base: 0,
            len,
            pos: 0,
        })
    }

    /// Window over `len` bytes at `offset` of this window. Refuses ranges that
    /// reach past the end of this window.
    pub fn slice(&self, name: &str, offset: u64, len: u64) -> Result<Window> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => {},
            _ => return Err(Error::bounds_violation(name, offset, len, self.len)),
        }

        Ok(Window {
            file: self.file.clone(),
            base: self.base + offset,
            len,
            pos:  0,
        })
    }

    pub fn rewound(&self) -> Window {
        Window {
            file: self.file.clone(),
            base: self.base,
            len:  self.len,
            pos:  0,
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    #[inline]
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Fills `buf` from `offset` without moving this window's position.
    pub fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        let end = offset.checked_add(buf.len() as u64);
        if end.map_or(true, |end| end > self.len) {
            return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof,
                "read past the end of the window"));
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.base + offset))?;
        file.read_exact(buf)
    }

    /// Copies `count` bytes from the current position into `out`.
    pub fn transfer_to(&mut self, out: &mut fs::File, count: u64) -> std::io::Result<()> {
        if count > self.len.saturating_sub(self.pos) {
            return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof,
                "transfer past the end of the window"));
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.base + self.pos))?;
        transfer(&mut file, out, count as usize)?;
        self.pos += count;

        Ok(())
    }
}

impl Read for Window {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.len.saturating_sub(self.pos);
        let count = remaining.min(buf.len() as u64) as usize;
        if count == 0 {
            return Ok(0);
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(self.base + self.pos))?;
        let count = file.read(&mut buf[..count])?;
        self.pos += count as u64;

        Ok(count)
    }
}

impl Seek for Window {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset)   => Some(offset),
            SeekFrom::End(offset)     => add_signed(self.len, offset),
            SeekFrom::Current(offset) => add_signed(self.pos, offset),
        };

        match target {
            Some(target) => {
                self.pos = target;
                Ok(target)
            },
            None => Err(std::io::Error::new(std::io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position")),
        }
    }
}

#[inline]
fn add_signed(value: u64, offset: i64) -> Option<u64> {
    if offset < 0 {
        value.checked_sub(offset.unsigned_abs())
    } else {
        value.checked_add(offset as u64)
    }
}

#[cfg(target_os = "linux")]
pub fn transfer(in_file: &mut std::fs::File, out_file: &mut std::fs::File, count: usize) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let in_fd  = in_file.as_raw_fd();
    let out_fd = out_file.as_raw_fd();

    let mut remaining = count;
    while remaining > 0 {
        unsafe {
            let result = libc::sendfile(out_fd, in_fd, std::ptr::null_mut(), remaining as libc::size_t);

            if result < 0 {
                return Err(std::io::Error::last_os_error());
            }

            if result == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof,
                    "unexpected end of file"));
            }

            remaining -= result as usize;
        }
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn transfer(in_file: &mut std::fs::File, out_file: &mut std::fs::File, count: usize) -> std::io::Result<()> {
    use std::io::Write;
    use crate::consts::BUFFER_SIZE;

    let mut buf = vec![0u8; BUFFER_SIZE];

    let mut remaining = count;
    while remaining >= BUFFER_SIZE {
        in_file.read_exact(&mut buf)?;
        out_file.write_all(&buf)?;
        remaining -= BUFFER_SIZE;
    }

    if remaining > 0 {
        let buf = &mut buf[..remaining];
        in_file.read_exact(buf)?;
        out_file.write_all(buf)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with(data: &[u8]) -> (tempfile::TempDir, Window) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, data).unwrap();
        let window = Window::open(&path).unwrap();
        (dir, window)
    }

    #[test]
    fn slice_reads_only_its_range() {
        let (_dir, window) = window_with(b"0123456789");
        let mut slice = window.slice("mid", 3, 4).unwrap();
        let mut out = Vec::new();
        slice.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"3456");
    }

    #[test]
    fn slice_past_end_is_bounds_violation() {
        let (_dir, window) = window_with(b"0123456789");
        let error = window.slice("tail", 8, 4).err().unwrap();
        assert_eq!(error.kind(), crate::result::ErrorKind::BoundsViolation);
        assert!(window.slice("huge", u64::MAX, 2).is_err());
    }

    #[test]
    fn seek_from_end_is_relative_to_window() {
        let (_dir, window) = window_with(b"0123456789");
        let mut slice = window.slice("mid", 2, 6).unwrap();
        assert_eq!(slice.seek(SeekFrom::End(-2)).unwrap(), 4);
        let mut out = [0u8; 2];
        slice.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"67");
        assert!(slice.seek(SeekFrom::Current(-10)).is_err());
    }

    #[test]
    fn little_endian_helpers() {
        let data = [0x50u8, 0x4b, 0x05, 0x06, 0xff, 0xff];
        assert_eq!(get_u32(&data, 0), 0x06054b50);
        assert_eq!(get_u16(&data, 4), 0xffff);
        let mut cursor = std::io::Cursor::new(&data[..]);
        assert_eq!(read_i32(&mut cursor).unwrap(), 0x06054b50);
        assert_eq!(stream_len(&mut cursor).unwrap(), 6);
        assert_eq!(cursor.position(), 4);
    }
}
