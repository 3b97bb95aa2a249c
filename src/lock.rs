//! File-based locking for opened archives.
//!
//! Cross-platform (fs2) advisory lock, shared mode: many readers may project
//! the same database at once, while cooperating writers stay out. The lock
//! is taken on the archive file itself and released on Drop. Best-effort:
//! sessions still work on filesystems without advisory locking.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

pub struct SharedLock {
    file: std::fs::File,
    path: PathBuf,
}

impl SharedLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SharedLock {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

/// Try to take a shared lock on `path`. Returns Err when the file cannot be
/// opened or another process holds it exclusively.
pub fn try_acquire_shared(path: &Path) -> Result<SharedLock> {
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("open for shared lock {}", path.display()))?;
    file.try_lock_shared()
        .with_context(|| format!("try_lock_shared failed: {}", path.display()))?;
    Ok(SharedLock {
        file,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn shared_locks_coexist() {
        let path = std::env::temp_dir().join(format!(
            "msiview-lock-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"x").unwrap();
        drop(f);

        let a = try_acquire_shared(&path).unwrap();
        let b = try_acquire_shared(&path).unwrap();
        assert_eq!(a.path(), path.as_path());
        drop(a);
        drop(b);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_fails() {
        let path = std::env::temp_dir().join("msiview-lock-does-not-exist");
        assert!(try_acquire_shared(&path).is_err());
    }
}
