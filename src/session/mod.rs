//! session - one opened database and its projected file collection.
//!
//! Split by submodule:
//! - mod.rs      - the Session struct, discovery state, arena helpers
//! - discover.rs - table-name listing, table loading, file materialization
//! - extract.rs  - sequential enumeration and chunked extraction
//!
//! Ownership model: the session owns every Table and VirtualFile in two
//! arenas; cross-references (file -> owning table, alias -> target) are plain
//! indices, valid until the session is dropped. Dropping the session closes
//! every row cursor and releases the archive lock; there is no separate
//! teardown step to get wrong.

mod discover;
mod extract;

pub use extract::ExtractStatus;

use std::time::SystemTime;

use crate::config::MsiViewConfig;
use crate::errors::Result;
use crate::file::{FileId, VirtualFile};
use crate::lock::SharedLock;
use crate::source::DataSource;
use crate::table::Table;

/// DOS archive attribute, reported for every entry.
pub const ATTR_ARCHIVE: u32 = 0x20;

/// One enumerated entry, as handed to the surrounding protocol adapter.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub size: u64,
    pub mtime: SystemTime,
    pub attrs: u32,
}

/// Discovery progress. Transitions run forward only and each step is
/// idempotent, so repeated `discover()` calls are cheap no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DiscoveryState {
    Start,
    NamesLoaded,
    TablesLoaded,
    FilesMaterialized,
}

pub struct Session {
    pub(crate) source: Box<dyn DataSource>,
    pub(crate) config: MsiViewConfig,
    pub(crate) state: DiscoveryState,
    pub(crate) table_names: Vec<String>,
    pub(crate) tables: Vec<Table>,
    pub(crate) files: Vec<VirtualFile>,
    /// Next file index to hand out; `None` until enumeration starts.
    pub(crate) cursor: Option<usize>,
    /// The most recently listed entry; extraction acts on this one.
    pub(crate) last_returned: Option<FileId>,
    archive_time: SystemTime,
    _lock: Option<SharedLock>,
}

impl Session {
    pub fn new(source: Box<dyn DataSource>, config: MsiViewConfig) -> Self {
        Session {
            source,
            config,
            state: DiscoveryState::Start,
            table_names: Vec::new(),
            tables: Vec::new(),
            files: Vec::new(),
            cursor: None,
            last_returned: None,
            archive_time: SystemTime::UNIX_EPOCH,
            _lock: None,
        }
    }

    /// Timestamp reported for every entry (the archive file's mtime).
    pub fn with_archive_time(mut self, time: SystemTime) -> Self {
        self.archive_time = time;
        self
    }

    /// Hold a shared advisory lock on the archive for the session lifetime.
    pub fn with_lock(mut self, lock: Option<SharedLock>) -> Self {
        self._lock = lock;
        self
    }

    #[inline]
    pub fn archive_time(&self) -> SystemTime {
        self.archive_time
    }

    /// Number of virtual files, forcing discovery if it has not run yet.
    pub fn entry_count(&mut self) -> Result<usize> {
        self.discover()?;
        Ok(self.files.len())
    }

    /// Display names in materialization order (diagnostics, CLI listing).
    pub fn file_names(&mut self) -> Result<Vec<String>> {
        self.discover()?;
        Ok(self.files.iter().map(|f| f.name().to_string()).collect())
    }

    /// Follow alias links to the entry that owns the content. Targets always
    /// precede their aliases in the arena, so the walk terminates.
    pub(crate) fn resolve_target(&self, mut id: FileId) -> FileId {
        while let Some(target) = self.files[id].alias_target() {
            id = target;
        }
        id
    }

    /// Resolve the size of `id` (following aliases) without loading content.
    pub(crate) fn ensure_file_size(&mut self, id: FileId) -> Result<u64> {
        let target = self.resolve_target(id);
        let (files, tables) = (&mut self.files, &mut self.tables);
        let file = &mut files[target];
        let table = match file.table() {
            Some(tid) => Some(&mut tables[tid]),
            None => None,
        };
        file.ensure_size(table)
    }

    /// Load the content of `id` (following aliases) into its cache.
    pub(crate) fn load_file(&mut self, id: FileId) -> Result<FileId> {
        let target = self.resolve_target(id);
        let (files, tables) = (&mut self.files, &mut self.tables);
        let file = &mut files[target];
        let table = match file.table() {
            Some(tid) => Some(&mut tables[tid]),
            None => None,
        };
        file.load(table)?;
        Ok(target)
    }

    /// Case-insensitive lookup among already-materialized files.
    pub(crate) fn find_file_ci(&self, name: &str) -> Option<FileId> {
        self.files
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Allocate a display name unique against every file handed out so far.
    pub(crate) fn allocate_name(&self, folder: Option<&str>, base: &str, ext: &str) -> String {
        crate::names::allocate(
            |candidate| {
                self.files
                    .iter()
                    .any(|f| f.name().eq_ignore_ascii_case(candidate))
            },
            folder,
            base,
            ext,
        )
    }
}
