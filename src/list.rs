use crate::sort::{sort, Item, Order, DEFAULT_ORDER};
use crate::util::{file_name, format_size, match_file_name, match_path_suffix, print_table, Align::*};
use crate::result::{Result, Error};
use crate::container::ContainerKind;
use crate::vfs::VirtualFileSystem;

pub struct ListOptions<'a> {
    pub order: &'a Order,
    pub human_readable: bool,
    pub filter: Option<&'a [&'a str]>,
}

impl ListOptions<'_> {
    #[inline]
    pub fn new() -> Self {
        ListOptions::default()
    }
}

impl Default for ListOptions<'_> {
    #[inline]
    fn default() -> Self {
        Self {
            order: &DEFAULT_ORDER,
            human_readable: false,
            filter: None,
        }
    }
}

fn matches_filter(path: &str, pattern: &str) -> bool {
    if pattern.contains('*') || pattern.contains('?') {
        match_file_name(path, pattern) || match_file_name(file_name(path), pattern)
    } else {
        match_path_suffix(path, pattern)
    }
}

/// Lumps of the primary index selected by `filter`, sorted by `order`.
///
/// A filter item is a wildcard pattern matched against the full path or the
/// file name, or a plain name matched like a lump lookup. Every item has to
/// select at least one lump.
pub fn select_lumps<'a>(fs: &'a VirtualFileSystem, filter: Option<&[&str]>, order: &Order) -> Result<Vec<Item<'a>>> {
    let index = fs.primary_index();
    let mut lumps: Vec<Item> = match filter {
        None => index.iter().enumerate().map(|(lump_num, entry)| (lump_num, &**entry)).collect(),
        Some(patterns) => {
            for pattern in patterns {
                if !index.iter().any(|entry| matches_filter(entry.path(), pattern)) {
                    return Err(Error::not_found(*pattern));
                }
            }
            index.iter().enumerate()
                .filter(|(_, entry)| patterns.iter().any(|pattern| matches_filter(entry.path(), pattern)))
                .map(|(lump_num, entry)| (lump_num, &**entry))
                .collect()
        }
    };

    sort(&mut lumps, order);
    Ok(lumps)
}

pub fn list(fs: &VirtualFileSystem, options: ListOptions) -> Result<()> {
    let lumps = select_lumps(fs, options.filter, options.order)?;

    let mut table: Vec<Vec<String>> = Vec::new();

    let fmt_size = if options.human_readable {
        |size: u64| format_size(size)
    } else {
        |size: u64| format!("{}", size)
    };

    for (lump_num, entry) in lumps {
        table.push(vec![
            format!("{}", lump_num),
            format!("{}", entry.container()),
            format!("{}", entry.offset()),
            fmt_size(entry.size()),
            entry.group().name().to_owned(),
            match entry.crc32() {
                Some(crc32) => format!("0x{:08x}", crc32),
                None => "-".to_owned(),
            },
            entry.path().to_owned(),
        ]);
    }

    print_table(
        &["Lump", "File", "Offset", "Size", "Group", "CRC32", "Path"],
        &[Right,  Right,  Right,    Right,  Left,    Right,   Left],
        &table);

    Ok(())
}

/// Prints the loaded files in load order.
pub fn list_files(fs: &VirtualFileSystem, human_readable: bool) -> Result<()> {
    let mut table: Vec<Vec<String>> = Vec::new();

    let fmt_size = if human_readable {
        |size: u64| format_size(size)
    } else {
        |size: u64| format!("{}", size)
    };

    for container in fs.loaded_files() {
        let mut flags = String::new();
        if container.is_startup() {
            flags.push('S');
        }
        if container.is_custom() {
            flags.push('C');
        }
        if container.parent().is_some() {
            flags.push('N');
        }

        table.push(vec![
            format!("{}", container.id()),
            container.kind().name().to_owned(),
            flags,
            fmt_size(container.len()),
            format!("{}", container.entries().len()),
            match container.kind() {
                ContainerKind::Wad { crc, .. } => format!("0x{:08x}", crc),
                _ => "-".to_owned(),
            },
            container.path().to_owned(),
        ]);
    }

    print_table(
        &["File", "Type", "Flags", "Size", "Entries", "CRC", "Path"],
        &[Right,  Left,   Left,    Right,  Right,     Right, Left],
        &table);

    Ok(())
}
