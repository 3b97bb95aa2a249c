//! manager - typed session-handle table and the host-facing entry points.
//!
//! The surrounding protocol adapter holds opaque `SessionHandle` values and
//! calls back in through the manager. Handles are validated against a slot
//! table (index + generation) - a stale or foreign handle is an error, never
//! a reinterpreted pointer. Every entry point locks the target session for
//! its whole call, so calls against one session serialize while different
//! sessions proceed independently.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use log::debug;

use crate::config::MsiViewConfig;
use crate::errors::{MsiError, Result};
use crate::lock;
use crate::session::{Entry, ExtractStatus, Session};
use crate::source::SourceOpener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    session: Option<Arc<Mutex<Session>>>,
}

pub struct SessionManager {
    opener: Box<dyn SourceOpener>,
    config: MsiViewConfig,
    slots: Mutex<Vec<Slot>>,
}

fn lock_ignore_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionManager {
    pub fn new(opener: Box<dyn SourceOpener>) -> Self {
        Self::with_config(opener, MsiViewConfig::from_env())
    }

    pub fn with_config(opener: Box<dyn SourceOpener>, config: MsiViewConfig) -> Self {
        SessionManager {
            opener,
            config,
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Open `path` as a database session. Opener failures surface as
    /// `UnknownFormat`: the file is simply not ours.
    pub fn open_session(&self, path: &Path) -> Result<SessionHandle> {
        let source = self.opener.open(path).map_err(|err| match err {
            MsiError::UnknownFormat(_) => err,
            other => MsiError::UnknownFormat(other.to_string()),
        })?;

        let mtime = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        // Best-effort shared lock; sessions still work without one.
        let archive_lock = match lock::try_acquire_shared(path) {
            Ok(guard) => Some(guard),
            Err(err) => {
                debug!("no shared lock on {}: {:#}", path.display(), err);
                None
            }
        };

        let session = Session::new(source, self.config.clone())
            .with_archive_time(mtime)
            .with_lock(archive_lock);
        let session = Arc::new(Mutex::new(session));

        let mut slots = lock_ignore_poison(&self.slots);
        let index = match slots.iter().position(|s| s.session.is_none()) {
            Some(free) => {
                slots[free].session = Some(session);
                free
            }
            None => {
                slots.push(Slot {
                    generation: 0,
                    session: Some(session),
                });
                slots.len() - 1
            }
        };
        Ok(SessionHandle {
            index: index as u32,
            generation: slots[index].generation,
        })
    }

    /// Close and tear down. The slot generation bumps, so every outstanding
    /// copy of this handle goes stale immediately.
    pub fn close_session(&self, handle: SessionHandle) -> Result<()> {
        let mut slots = lock_ignore_poison(&self.slots);
        let slot = slots
            .get_mut(handle.index as usize)
            .ok_or(MsiError::InvalidHandle)?;
        if slot.generation != handle.generation {
            return Err(MsiError::InvalidHandle);
        }
        let session = slot.session.take().ok_or(MsiError::InvalidHandle)?;
        slot.generation = slot.generation.wrapping_add(1);
        drop(slots);
        // Teardown runs when the last reference drops; an in-flight call on
        // another thread finishes against its own clone first.
        drop(session);
        Ok(())
    }

    fn session(&self, handle: SessionHandle) -> Result<Arc<Mutex<Session>>> {
        let slots = lock_ignore_poison(&self.slots);
        let slot = slots
            .get(handle.index as usize)
            .ok_or(MsiError::InvalidHandle)?;
        if slot.generation != handle.generation {
            return Err(MsiError::InvalidHandle);
        }
        slot.session.clone().ok_or(MsiError::InvalidHandle)
    }

    /// Next entry of the session's collection, or `None` when exhausted.
    pub fn get_next_entry(&self, handle: SessionHandle) -> Result<Option<Entry>> {
        let session = self.session(handle)?;
        let mut session = lock_ignore_poison(&session);
        session.get_next()
    }

    /// Extract the entry most recently returned by `get_next_entry`.
    pub fn extract_last(
        &self,
        handle: SessionHandle,
        sink: &mut dyn Write,
        progress: &mut dyn FnMut(u64) -> bool,
    ) -> Result<ExtractStatus> {
        let session = self.session(handle)?;
        let mut session = lock_ignore_poison(&session);
        session.extract_last(sink, progress)
    }

    /// True iff `path` opens as a database: open, then drop immediately.
    pub fn can_handle(&self, path: &Path) -> bool {
        self.opener.open(path).is_ok()
    }

    /// Live session count (teardown instrumentation for tests).
    pub fn open_sessions(&self) -> usize {
        lock_ignore_poison(&self.slots)
            .iter()
            .filter(|s| s.session.is_some())
            .count()
    }
}
