//! names - unique, path-safe display-name allocation for virtual files.
//!
//! Entry names use `\` as the path separator (the wire format of the archive
//! protocol this feeds). Collisions resolve with a `_NNN` suffix before the
//! extension, three digits, starting at 001; the folder prefix survives the
//! retry. Allocation is deterministic for a fixed used-name set.

/// Separator between the owning-table folder and the entry base name.
pub const PATH_SEPARATOR: char = '\\';

/// Replace control characters (code points below 0x20) with `_`.
pub fn make_file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if (c as u32) < 0x20 { '_' } else { c })
        .collect()
}

/// Split `name` into (base, extension) on the last `.`; the extension keeps
/// its dot. A dot at position 0 does not count as an extension separator.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

fn compose(folder: Option<&str>, base: &str, suffix: Option<u32>, ext: &str) -> String {
    let mut out = String::new();
    if let Some(folder) = folder {
        if !folder.is_empty() {
            out.push_str(folder);
            out.push(PATH_SEPARATOR);
        }
    }
    out.push_str(base);
    if let Some(n) = suffix {
        out.push_str(&format!("_{:03}", n));
    }
    out.push_str(ext);
    out
}

/// Allocate a unique name. `is_taken` is queried with each candidate and must
/// compare case-insensitively against every name already handed out.
pub fn allocate<F>(mut is_taken: F, folder: Option<&str>, base: &str, ext: &str) -> String
where
    F: FnMut(&str) -> bool,
{
    let base = make_file_safe(base);
    let mut candidate = compose(folder, &base, None, ext);
    let mut index = 1u32;
    while is_taken(&candidate) {
        candidate = compose(folder, &base, Some(index), ext);
        index += 1;
    }
    candidate
}
