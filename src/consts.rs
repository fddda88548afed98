pub type Magic = [u8; 4];
pub type Md5 = [u8; 16];

pub const BUFFER_SIZE: usize = 1024 * 1024;

// WAD
pub const IWAD_MAGIC: Magic = *b"IWAD";
pub const PWAD_MAGIC: Magic = *b"PWAD";

pub const WAD_HEADER_SIZE:  usize = 4 * 3;
pub const WAD_DIR_ENTRY_SIZE: usize = 4 * 2 + WAD_LUMP_NAME_SIZE;
pub const WAD_LUMP_NAME_SIZE: usize = 8;

// ZIP
pub const SIG_LOCAL_FILE_HEADER:   u32 = 0x04034b50;
pub const SIG_CENTRAL_FILE_HEADER: u32 = 0x02014b50;
pub const SIG_END_OF_CENTRAL_DIR:  u32 = 0x06054b50;

/// End of central directory record without the comment, including the signature.
pub const CENTRAL_END_SIZE: usize = 22;
/// Central file header without its variable sized fields, including the signature.
pub const CENTRAL_FILE_HEADER_SIZE: usize = 46;
/// Local file header without its variable sized fields, including the signature.
pub const LOCAL_FILE_HEADER_SIZE: usize = 30;

pub const DEFAULT_MAX_COMMENT_SIZE: u64 = 2048;

/// Longest entry name accepted from a central directory.
pub const MAX_ENTRY_NAME_SIZE: usize = 511;

pub const ZFH_ENCRYPTED: u16 = 0x1;
pub const ZFC_NO_COMPRESSION: u16 = 0;

/// Extension given to lumps mapped into an archive's path space.
pub const LUMP_EXTENSION: &str = "lmp";
