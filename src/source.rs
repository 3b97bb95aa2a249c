//! source - trait seams for the external database engine.
//!
//! The projection core never parses the database file itself; it talks to a
//! collaborator through these traits:
//! - DataSource: table-name listing, row-cursor opening, summary access.
//! - TableView: schema (parallel name/type-tag lists) and a re-executable
//!   row cursor. `execute` must be callable repeatedly; the CSV renderer runs
//!   a sizing pass and then a fill pass over the same view.
//! - RowHandle: one fetched row. Stream reads are split into a cheap declared
//!   length query and a full transfer, so size can resolve without content.
//! - SummaryInfo: the fixed ordered document-property accessor.
//!
//! All traits are Send: a session may be driven from any host thread (calls
//! are serialized by the session lock, not by the source).

use crate::errors::Result;

/// Property type tags as stored by the document-summary accessor.
pub const VT_EMPTY: u32 = 0;
pub const VT_I2: u32 = 2;
pub const VT_I4: u32 = 3;
pub const VT_LPSTR: u32 = 30;
pub const VT_FILETIME: u32 = 64;

/// Raw result of the fixed property accessor: the tag selects which of the
/// value fields is meaningful.
#[derive(Debug, Clone, Default)]
pub struct RawProperty {
    pub type_tag: u32,
    pub int_value: i32,
    /// 100 ns ticks since 1601-01-01 UTC; 0 means "not present".
    pub file_time: u64,
    pub string_value: String,
}

impl RawProperty {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Parallel column lists as returned by the view. Lengths may disagree on a
/// malformed database; the table loader checks.
#[derive(Debug, Clone, Default)]
pub struct ViewColumns {
    pub names: Vec<String>,
    pub type_tags: Vec<String>,
}

pub trait RowHandle: Send {
    /// Integer cell; `None` is the database null sentinel.
    fn integer(&self, column: usize) -> Result<Option<i32>>;

    /// String cell, already decoded to native UTF-8.
    fn string(&self, column: usize) -> Result<String>;

    /// Declared byte length of a stream cell. Must not transfer the content.
    fn stream_size(&self, column: usize) -> Result<u64>;

    /// Transfer the full stream into `out`, returning bytes written.
    fn read_stream(&self, column: usize, out: &mut [u8]) -> Result<usize>;
}

pub trait TableView: Send {
    fn columns(&mut self) -> Result<ViewColumns>;

    /// (Re)start the row cursor from the first row.
    fn execute(&mut self) -> Result<()>;

    /// Fetch the next row, or `None` at the end of the cursor.
    fn fetch(&mut self) -> Result<Option<Box<dyn RowHandle>>>;
}

pub trait SummaryInfo: Send {
    /// Fixed ordered accessor; `index` addresses one of the well-known slots.
    fn property(&self, index: usize) -> Result<RawProperty>;
}

pub trait DataSource: Send {
    /// Primary table-name list. The reserved streams table may legitimately
    /// be absent here even when `open_view` on it succeeds.
    fn table_names(&mut self) -> Result<Vec<String>>;

    /// Open a row cursor over one table. Unknown names are an error.
    fn open_view(&mut self, table: &str) -> Result<Box<dyn TableView>>;

    /// Document-summary property set, if the database carries one.
    fn open_summary(&mut self) -> Result<Option<Box<dyn SummaryInfo>>>;
}

/// Opens a database file for the session manager. Failure means "not ours".
pub trait SourceOpener: Send + Sync {
    fn open(&self, path: &std::path::Path) -> Result<Box<dyn DataSource>>;
}
