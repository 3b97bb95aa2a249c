use std::path::{Path, PathBuf};
use std::time::SystemTime;

use msiview::json::JsonOpener;
use msiview::{MsiViewConfig, SessionManager};

/// Manager over the JSON-described database format.
pub fn manager(no_summary: bool) -> SessionManager {
    let cfg = MsiViewConfig::from_env().with_include_summary(!no_summary);
    SessionManager::with_config(Box::new(JsonOpener), cfg)
}

/// Entry timestamps render in UTC, same shape the summary renderer uses.
pub fn format_mtime(mtime: SystemTime) -> String {
    chrono::DateTime::<chrono::Utc>::from(mtime)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Map an archive entry name (backslash-separated) onto a local path under
/// `out`. Components are taken as-is; the allocator already made them safe.
pub fn entry_path(out: &Path, entry_name: &str) -> PathBuf {
    let mut path = out.to_path_buf();
    for part in entry_name.split('\\') {
        path.push(part);
    }
    path
}
