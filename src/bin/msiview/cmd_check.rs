use anyhow::Result;
use std::path::PathBuf;

use super::util::manager;

pub fn exec(path: PathBuf) -> Result<()> {
    let mgr = manager(true);
    if mgr.can_handle(&path) {
        println!("OK {}", path.display());
        Ok(())
    } else {
        anyhow::bail!("not a supported database: {}", path.display());
    }
}
