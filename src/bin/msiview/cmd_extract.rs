use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use msiview::ExtractStatus;

use super::util::{entry_path, manager};

pub fn exec(path: PathBuf, out: PathBuf, no_summary: bool) -> Result<()> {
    let mgr = manager(no_summary);
    let handle = mgr
        .open_session(&path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut count = 0usize;
    while let Some(entry) = mgr.get_next_entry(handle)? {
        let dest = entry_path(&out, &entry.name);
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let mut sink = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&dest)
            .map_err(msiview::MsiError::CreateFailed)
            .with_context(|| format!("create {}", dest.display()))?;

        let status = mgr.extract_last(handle, &mut sink, &mut |_done| true)?;
        match status {
            ExtractStatus::Completed => {
                println!("{:>12}  {}", entry.size, dest.display());
                count += 1;
            }
            ExtractStatus::Aborted => anyhow::bail!("extraction aborted"),
        }
    }
    println!("{} entries extracted to {}", count, out.display());

    mgr.close_session(handle)?;
    Ok(())
}
