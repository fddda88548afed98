use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::consts::LUMP_EXTENSION;

pub struct PathSplitter<'a> {
    path: &'a str,
    index: usize,
    char_iter: std::str::CharIndices<'a>,
}

impl<'a> Iterator for PathSplitter<'a> {
    type Item = (&'a str, &'a str, bool);

    fn next(&mut self) -> Option<(&'a str, &'a str, bool)> {
        let start_index = loop {
            if let Some((index, ch)) = self.char_iter.next() {
                if ch != '/' {
                    break index;
                }
            } else {
                return None;
            }
        };
        let end_index = loop {
            if let Some((index, ch)) = self.char_iter.next() {
                if ch == '/' {
                    self.index = index + 1;
                    break index;
                }
            } else {
                self.index = self.path.len();
                break self.index;
            }
        };

        if start_index == end_index {
            return None;
        }

        Some((&self.path[..end_index], &self.path[start_index..end_index], self.index == end_index))
    }
}

/// Iterates `(prefix, segment, is_last)` over the `/` separated segments of `path`.
pub fn split_path(path: &str) -> PathSplitter<'_> {
    let path = path.trim_matches('/');

    PathSplitter {
        path,
        index: 0,
        char_iter: path.char_indices(),
    }
}

/// Converts native separators to the canonical `/`.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

pub fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/') ||
        (bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/')
}

/// Makes `path` absolute against `base` and resolves `.` and `..` segments.
/// The result always uses `/` as separator.
pub fn make_absolute(base: &str, path: &str) -> String {
    let path = normalize_separators(path);
    let joined = if is_absolute(&path) {
        path
    } else {
        let base = normalize_separators(base);
        format!("{}/{}", base.trim_end_matches('/'), path)
    };

    clean_path(&joined)
}

pub fn clean_path(path: &str) -> String {
    let (root, rest) = if path.starts_with('/') {
        ("/", &path[1..])
    } else if is_absolute(path) {
        (&path[..3], &path[3..])
    } else {
        ("", path)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {},
            ".." => { segments.pop(); },
            segment => segments.push(segment),
        }
    }

    let mut cleaned = String::with_capacity(path.len());
    cleaned.push_str(root);
    cleaned.push_str(&segments.join("/"));
    if path.ends_with('/') && !segments.is_empty() {
        cleaned.push('/');
    }

    cleaned
}

pub fn path_to_string(path: impl AsRef<Path>) -> String {
    normalize_separators(&path.as_ref().to_string_lossy())
}

pub fn native_path(path: &str) -> PathBuf {
    PathBuf::from(path)
}

/// Case-insensitive ordering of two paths, byte by byte after ASCII case folding.
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    let a = a.bytes().map(|ch| ch.to_ascii_lowercase());
    let b = b.bytes().map(|ch| ch.to_ascii_lowercase());
    a.cmp(b)
}

#[inline]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len() &&
        value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

pub fn file_name(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Directory part of `path`, including the trailing separator.
pub fn file_name_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..=index],
        None => "",
    }
}

pub fn file_name_extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(index) => Some(&name[index + 1..]),
    }
}

pub fn file_name_without_extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(index) => &name[..index],
    }
}

/// Matches `string` against a wildcard `pattern` where `*` matches any run of
/// characters (including `/`) and `?` matches exactly one character. Case-insensitive.
pub fn match_file_name(string: &str, pattern: &str) -> bool {
    let string: Vec<char> = string.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let mut si = 0;
    let mut pi = 0;
    let mut star: Option<(usize, usize)> = None;

    while si < string.len() {
        if pi < pattern.len() && pattern[pi] == '*' {
            pi += 1;
            star = Some((pi, si));
            continue;
        }

        if pi < pattern.len() && (pattern[pi] == '?' || chars_eq_ignore_case(pattern[pi], string[si])) {
            pi += 1;
            si += 1;
            continue;
        }

        match star {
            Some((star_pi, star_si)) => {
                pi = star_pi;
                si = star_si + 1;
                star = Some((star_pi, star_si + 1));
            },
            None => return false,
        }
    }

    pattern[pi..].iter().all(|ch| *ch == '*')
}

#[inline]
fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// True when the segments of `query` equal the trailing segments of `path`
/// (case-insensitive). The last segment of `path` also matches with a `.lmp`
/// extension stripped, so `"PLAYPAL"` finds `/data/playpal.lmp`. An absolute
/// `query` has to match all of `path`.
pub fn match_path_suffix(path: &str, query: &str) -> bool {
    let path_segments: Vec<&str> = split_path(path).map(|(_, item, _)| item).collect();
    let query_segments: Vec<&str> = split_path(query).map(|(_, item, _)| item).collect();

    if query_segments.is_empty() || query_segments.len() > path_segments.len() {
        return false;
    }

    if is_absolute(query) && (query_segments.len() != path_segments.len() || !is_absolute(path)) {
        return false;
    }

    let offset = path_segments.len() - query_segments.len();
    let last = query_segments.len() - 1;
    for (index, query_item) in query_segments.iter().enumerate() {
        let item = path_segments[offset + index];
        if eq_ignore_case(item, query_item) {
            continue;
        }
        if index == last && eq_ignore_case(strip_lump_extension(item), query_item) {
            continue;
        }
        return false;
    }

    true
}

pub fn strip_lump_extension(name: &str) -> &str {
    match file_name_extension(name) {
        Some(ext) if eq_ignore_case(ext, LUMP_EXTENSION) => &name[..name.len() - ext.len() - 1],
        _ => name,
    }
}

pub fn format_size(size: u64) -> String {
    if size >= 1024 * 1024 * 1024 {
        format!("{} G", size / (1024 * 1024 * 1024))
    } else if size >= 1024 * 1024 {
        format!("{} M", size / (1024 * 1024))
    } else if size >= 1024 {
        format!("{} K", size / 1024)
    } else {
        format!("{} B", size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub fn print_row(row: &[impl AsRef<str>], lens: &[usize], align: &[Align]) {
    let mut first = true;
    for ((cell, len), align) in row.iter().zip(lens.iter()).zip(align.iter()) {
        if first {
            first = false;
        } else {
            print!("  "); // cell spacing
        }

        match align {
            Align::Right => print!("{:>1$}", cell.as_ref(), *len),
            Align::Left  => print!("{:<1$}", cell.as_ref(), *len),
        }
    }

    println!();
}

pub fn print_table(header: &[impl AsRef<str>], align: &[Align], body: &[Vec<impl AsRef<str>>]) {
    let mut lens: Vec<usize> = header.iter().map(|x| x.as_ref().chars().count()).collect();
    for row in body {
        for (cell, max_len) in row.iter().zip(lens.iter_mut()) {
            let len = cell.as_ref().chars().count();
            if len > *max_len {
                *max_len = len;
            }
        }
    }

    print_row(header, &lens, align);
    let mut first = true;
    for len in lens.iter() {
        let mut len = *len;
        if first {
            first = false;
        } else {
            len += 2; // cell spacing
        }

        print!("{}", "-".repeat(len));
    }
    println!();

    for row in body {
        print_row(row, &lens, align);
    }
}
