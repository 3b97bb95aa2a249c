//! session/extract - sequential enumeration and chunked extraction.
//!
//! The protocol is "list one entry, then extract whatever was listed last":
//! `get_next` resolves the size of the next entry and remembers it as the
//! extraction target; `extract_last` loads that entry's content once and
//! streams the cached buffer to the sink in fixed-size chunks.

use std::io::Write;

use log::warn;

use crate::errors::{MsiError, Result};
use crate::session::{Entry, Session, ATTR_ARCHIVE};

/// Outcome of an extraction. Aborts come from the progress callback only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStatus {
    Completed,
    Aborted,
}

impl Session {
    /// Next entry in materialization order, with its size resolved, or
    /// `None` once the collection is exhausted (normal termination).
    /// An entry whose size cannot be resolved is logged and skipped.
    pub fn get_next(&mut self) -> Result<Option<Entry>> {
        self.discover()?;
        let mut index = self.cursor.unwrap_or(0);
        loop {
            if index >= self.files.len() {
                self.cursor = Some(index);
                return Ok(None);
            }
            match self.ensure_file_size(index) {
                Ok(size) => {
                    self.cursor = Some(index + 1);
                    self.last_returned = Some(index);
                    let file = &self.files[index];
                    return Ok(Some(Entry {
                        name: file.name().to_string(),
                        size,
                        mtime: self.archive_time(),
                        attrs: ATTR_ARCHIVE,
                    }));
                }
                Err(err) => {
                    warn!(
                        "skipping entry '{}': {}",
                        self.files[index].name(),
                        err
                    );
                    index += 1;
                }
            }
        }
    }

    /// Restart enumeration from the first entry without re-running
    /// discovery. Clears the extraction target.
    pub fn rewind(&mut self) {
        self.cursor = None;
        self.last_returned = None;
    }

    /// Stream the most recently listed entry to `sink`. The progress
    /// callback runs before every chunk with the bytes done so far, and once
    /// more with the total when nothing remains; returning `false` aborts.
    pub fn extract_last(
        &mut self,
        sink: &mut dyn Write,
        progress: &mut dyn FnMut(u64) -> bool,
    ) -> Result<ExtractStatus> {
        let id = self.last_returned.ok_or(MsiError::Unsupported)?;
        let target = self.load_file(id)?;
        let chunk_bytes = self.config.chunk_bytes.max(1);
        let data = self.files[target]
            .cached_data()
            .ok_or(MsiError::Unsupported)?;

        let mut offset = 0usize;
        loop {
            if !progress(offset as u64) {
                return Ok(ExtractStatus::Aborted);
            }
            let remaining = data.len() - offset;
            if remaining == 0 {
                return Ok(ExtractStatus::Completed);
            }
            let n = remaining.min(chunk_bytes);
            sink.write_all(&data[offset..offset + n])
                .map_err(MsiError::WriteFailed)?;
            offset += n;
        }
    }
}
