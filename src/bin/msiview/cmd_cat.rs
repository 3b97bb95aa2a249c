use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use super::util::manager;

pub fn exec(path: PathBuf, name: String) -> Result<()> {
    let mgr = manager(false);
    let handle = mgr
        .open_session(&path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut found = false;
    while let Some(entry) = mgr.get_next_entry(handle)? {
        if entry.name.eq_ignore_ascii_case(&name) {
            let stdout = std::io::stdout();
            let mut sink = stdout.lock();
            mgr.extract_last(handle, &mut sink, &mut |_done| true)?;
            sink.flush()?;
            found = true;
            break;
        }
    }

    mgr.close_session(handle)?;
    if !found {
        anyhow::bail!("no entry named '{}' in {}", name, path.display());
    }
    Ok(())
}
