use anyhow::{Context, Result};
use std::path::PathBuf;

use super::util::{format_mtime, manager};

pub fn exec(path: PathBuf, no_summary: bool) -> Result<()> {
    let mgr = manager(no_summary);
    let handle = mgr
        .open_session(&path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut total = 0u64;
    let mut count = 0usize;
    while let Some(entry) = mgr.get_next_entry(handle)? {
        println!(
            "{:>12}  {}  {}",
            entry.size,
            format_mtime(entry.mtime),
            entry.name
        );
        total += entry.size;
        count += 1;
    }
    println!("{} entries, {} bytes", count, total);

    mgr.close_session(handle)?;
    Ok(())
}
