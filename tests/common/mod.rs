#![allow(dead_code)]

use std::fs;

use lumpfs::check::crc32_of;
use lumpfs::util::path_to_string;
use lumpfs::{FsConfig, VirtualFileSystem};

pub fn build_wad(magic: &[u8; 4], lumps: &[(&str, &[u8])]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(magic);
    data.extend_from_slice(&(lumps.len() as i32).to_le_bytes());
    data.extend_from_slice(&0i32.to_le_bytes());

    let mut directory = Vec::new();
    for (name, content) in lumps {
        let offset = data.len() as i32;
        data.extend_from_slice(content);
        directory.extend_from_slice(&offset.to_le_bytes());
        directory.extend_from_slice(&(content.len() as i32).to_le_bytes());
        let mut field = [0u8; 8];
        field[..name.len()].copy_from_slice(name.as_bytes());
        directory.extend_from_slice(&field);
    }

    let table_offset = data.len() as i32;
    data[8..12].copy_from_slice(&table_offset.to_le_bytes());
    data.extend_from_slice(&directory);
    data
}

/// A ZIP archive with every member stored uncompressed.
pub fn build_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut data = Vec::new();
    let mut central = Vec::new();

    for (name, content) in members {
        let offset = data.len() as u32;
        let crc = crc32_of(content);

        data.extend_from_slice(&0x04034b50u32.to_le_bytes());
        data.extend_from_slice(&20u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&[0; 4]);
        data.extend_from_slice(&crc.to_le_bytes());
        data.extend_from_slice(&(content.len() as u32).to_le_bytes());
        data.extend_from_slice(&(content.len() as u32).to_le_bytes());
        data.extend_from_slice(&(name.len() as u16).to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(name.as_bytes());
        data.extend_from_slice(content);

        central.extend_from_slice(&0x02014b50u32.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&[0; 4]);
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&(content.len() as u32).to_le_bytes());
        central.extend_from_slice(&(content.len() as u32).to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&[0; 8]);
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let central_offset = data.len() as u32;
    data.extend_from_slice(&central);

    data.extend_from_slice(&0x06054b50u32.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&(members.len() as u16).to_le_bytes());
    data.extend_from_slice(&(members.len() as u16).to_le_bytes());
    data.extend_from_slice(&(central.len() as u32).to_le_bytes());
    data.extend_from_slice(&central_offset.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data
}

/// A temporary base directory with an initialized file system rooted in it.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub fs:  VirtualFileSystem,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = VirtualFileSystem::new(FsConfig::with_base_path(path_to_string(dir.path())));
        fs.init().unwrap();
        Fixture { dir, fs }
    }

    /// Absolute virtual path of `name` below the base directory.
    pub fn path(&self, name: &str) -> String {
        self.fs.absolute_path(name)
    }

    /// Writes `data` to `name` below the base directory, creating parents.
    pub fn write(&self, name: &str, data: &[u8]) -> String {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, data).unwrap();
        self.path(name)
    }
}
