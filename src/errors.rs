//! errors - failure taxonomy for the projection core.
//!
//! Policy:
//! - Per-entry failures (one table, one row, one summary slot) are isolated:
//!   the offending item is skipped or errors on extract, the session survives.
//! - Only open-time failures and allocation failures inside session-level
//!   structures are fatal to the session.
//! - End of enumeration is `Ok(None)`, never an error.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MsiError>;

#[derive(Error, Debug)]
pub enum MsiError {
    /// The file is not a database this opener understands. Surfaced at open,
    /// fatal to that open attempt only.
    #[error("not a recognized database: {0}")]
    UnknownFormat(String),

    /// Malformed column metadata. Aborts materialization of the one table.
    #[error("schema error in table '{table}': {reason}")]
    Schema { table: String, reason: String },

    /// A stream-typed column reached the plain-table CSV render path.
    #[error("unsupported column '{column}' in table '{table}'")]
    UnsupportedColumn { table: String, column: String },

    /// A summary slot carried a type tag the renderer does not know.
    #[error("unsupported summary property type tag {0}")]
    UnsupportedPropertyType(u32),

    /// Content buffer allocation failed. Aborts the current operation only.
    #[error("out of memory allocating {0} bytes")]
    NoMemory(u64),

    /// Destination storage could not be created.
    #[error("cannot create destination: {0}")]
    CreateFailed(#[source] io::Error),

    /// Destination storage rejected a chunk.
    #[error("write to destination failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// The session handle is stale or was never issued.
    #[error("invalid session handle")]
    InvalidHandle,

    /// The requested operation has no object to act on (e.g. extract with no
    /// previously listed entry).
    #[error("operation not supported in this state")]
    Unsupported,

    /// The external database collaborator reported a failure.
    #[error("data source error: {0}")]
    Source(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MsiError {
    /// Wrap any displayable collaborator failure.
    #[inline]
    pub fn source<E: std::fmt::Display>(err: E) -> Self {
        MsiError::Source(err.to_string())
    }

    /// Schema error constructor, used by table loading and classification.
    #[inline]
    pub fn schema<T: Into<String>, R: Into<String>>(table: T, reason: R) -> Self {
        MsiError::Schema {
            table: table.into(),
            reason: reason.into(),
        }
    }
}
