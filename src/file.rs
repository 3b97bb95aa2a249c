//! file - one exposed virtual entry and its lazy materialization.
//!
//! Four kinds:
//! - Stream: one row of a stream-bearing table; content is the row's binary
//!   payload, size is the declared stream length (no transfer).
//! - Alias: a naming-only entry; size and content delegate to the target
//!   entry (resolved by the session, which owns the file arena).
//! - TableCsv: a whole plain table rendered as one CSV document.
//! - PropertyCsv: the document-summary property list rendered as CSV.
//!
//! Content is never loaded at creation. The buffer is sized exactly once from
//! a dry sizing pass (or the declared stream length) and never re-read after
//! it is cached.

use log::warn;

use crate::csv::{render_property_list, CsvWriter};
use crate::errors::{MsiError, Result};
use crate::source::{
    RowHandle, SummaryInfo, VT_EMPTY, VT_FILETIME, VT_I2, VT_I4, VT_LPSTR,
};
use crate::table::{ColumnType, Table};
use crate::util::format_filetime;

/// Index into the session's table arena.
pub type TableId = usize;
/// Index into the session's file arena.
pub type FileId = usize;

/// Literal rendered for an integer cell carrying the database null sentinel.
pub const NULL_TEXT: &str = "(null)";

/// The 20 well-known document-summary slots, in accessor order. `None` slots
/// are structurally empty and never queried.
const PROPERTY_NAMES: [Option<&str>; 20] = [
    None,
    Some("Codepage"),
    Some("Title"),
    Some("Subject"),
    Some("Author"),
    Some("Keywords"),
    Some("Comments"),
    Some("Template"),
    Some("Last Saved By"),
    Some("Revision Number"),
    None,
    Some("Last Printed"),
    Some("Create Time / Date"),
    Some("Last Save Time / Date"),
    Some("Page Count"),
    Some("Word Count"),
    Some("Character Count"),
    None,
    Some("Creating Application"),
    Some("Security"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Stream,
    Alias,
    TableCsv,
    PropertyCsv,
}

pub struct VirtualFile {
    name: String,
    kind: FileKind,
    table: Option<TableId>,
    row: Option<Box<dyn RowHandle>>,
    summary: Option<Box<dyn SummaryInfo>>,
    alias_target: Option<FileId>,
    size: Option<u64>,
    data: Option<Vec<u8>>,
}

impl VirtualFile {
    /// A per-row binary stream entry.
    pub fn stream(name: String, table: TableId, row: Box<dyn RowHandle>) -> Self {
        VirtualFile {
            name,
            kind: FileKind::Stream,
            table: Some(table),
            row: Some(row),
            summary: None,
            alias_target: None,
            size: None,
            data: None,
        }
    }

    /// A naming-only entry delegating to `target`.
    pub fn alias(name: String, table: TableId, target: FileId) -> Self {
        VirtualFile {
            name,
            kind: FileKind::Alias,
            table: Some(table),
            row: None,
            summary: None,
            alias_target: Some(target),
            size: None,
            data: None,
        }
    }

    /// A whole plain table as one CSV document.
    pub fn table_csv(name: String, table: TableId) -> Self {
        VirtualFile {
            name,
            kind: FileKind::TableCsv,
            table: Some(table),
            row: None,
            summary: None,
            alias_target: None,
            size: None,
            data: None,
        }
    }

    /// The document-summary property list as one CSV document.
    pub fn property_csv(name: String, summary: Box<dyn SummaryInfo>) -> Self {
        VirtualFile {
            name,
            kind: FileKind::PropertyCsv,
            table: None,
            row: None,
            summary: Some(summary),
            alias_target: None,
            size: None,
            data: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    #[inline]
    pub fn table(&self) -> Option<TableId> {
        self.table
    }

    #[inline]
    pub fn alias_target(&self) -> Option<FileId> {
        self.alias_target
    }

    /// Cached size, if already resolved.
    #[inline]
    pub fn cached_size(&self) -> Option<u64> {
        self.size
    }

    /// Cached content, if already loaded.
    #[inline]
    pub fn cached_data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Resolve the size without transferring stream content. Aliases are
    /// resolved by the session before this is called.
    pub fn ensure_size(&mut self, table: Option<&mut Table>) -> Result<u64> {
        debug_assert!(self.alias_target.is_none());
        if let Some(size) = self.size {
            return Ok(size);
        }
        let size = match self.kind {
            FileKind::Stream => {
                let table = table.ok_or(MsiError::Unsupported)?;
                let column = table.stream_column().ok_or(MsiError::Unsupported)?;
                let row = self.row.as_ref().ok_or(MsiError::Unsupported)?;
                row.stream_size(column)?
            }
            FileKind::TableCsv => {
                let table = table.ok_or(MsiError::Unsupported)?;
                render_table_csv(table, None)? as u64
            }
            FileKind::PropertyCsv => {
                let summary = self.summary.as_deref().ok_or(MsiError::Unsupported)?;
                let pairs = collect_property_pairs(summary)?;
                let mut sizer = CsvWriter::sizing();
                sizer.bom();
                sizer.record(["Name", "Value"]);
                for (name, value) in &pairs {
                    sizer.field(name, 0);
                    sizer.field(value, 1);
                    sizer.endline();
                }
                sizer.written() as u64
            }
            FileKind::Alias => return Err(MsiError::Unsupported),
        };
        self.size = Some(size);
        Ok(size)
    }

    /// Load the full content into the cache. No-op when already cached.
    pub fn load(&mut self, table: Option<&mut Table>) -> Result<()> {
        debug_assert!(self.alias_target.is_none());
        if self.data.is_some() {
            return Ok(());
        }
        match self.kind {
            FileKind::Stream => {
                let table = table.ok_or(MsiError::Unsupported)?;
                let column = table.stream_column().ok_or(MsiError::Unsupported)?;
                let size = self.ensure_size(Some(table))?;
                let mut buf = alloc_exact(size)?;
                let row = self.row.as_ref().ok_or(MsiError::Unsupported)?;
                let written = row.read_stream(column, &mut buf)?;
                if written as u64 != size {
                    warn!(
                        "stream '{}': declared {} bytes, transferred {}",
                        self.name, size, written
                    );
                    buf.truncate(written);
                    self.size = Some(written as u64);
                }
                self.data = Some(buf);
            }
            FileKind::TableCsv => {
                let table = table.ok_or(MsiError::Unsupported)?;
                let size = self.ensure_size(Some(&mut *table))?;
                let mut buf = alloc_exact(size)?;
                let written = render_table_csv(table, Some(&mut buf))? as u64;
                if written != size {
                    warn!(
                        "table csv '{}': sizing pass saw {} bytes, fill pass {}",
                        self.name, size, written
                    );
                    buf.truncate(written.min(size) as usize);
                    self.size = Some(buf.len() as u64);
                }
                self.data = Some(buf);
            }
            FileKind::PropertyCsv => {
                let summary = self.summary.as_deref().ok_or(MsiError::Unsupported)?;
                let pairs = collect_property_pairs(summary)?;
                let buf = render_property_list(&pairs);
                self.size = Some(buf.len() as u64);
                self.data = Some(buf);
            }
            FileKind::Alias => return Err(MsiError::Unsupported),
        }
        Ok(())
    }
}

/// Allocate a zeroed buffer of exactly `size` bytes, reporting allocation
/// failure as an error instead of aborting.
fn alloc_exact(size: u64) -> Result<Vec<u8>> {
    let len = size as usize;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| MsiError::NoMemory(size))?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Render a plain table as CSV: header record, then one record per row.
/// With `out == None` this is the sizing pass; the caller allocates from the
/// returned count and runs the fill pass. Stream-typed columns are a defect
/// on this path.
pub(crate) fn render_table_csv(table: &mut Table, out: Option<&mut [u8]>) -> Result<usize> {
    let table_name = table.name().to_string();
    let (view, columns) = table.parts();

    let mut w = match out {
        Some(buf) => CsvWriter::filling(buf),
        None => CsvWriter::sizing(),
    };
    w.bom();
    w.record(columns.iter().map(|c| c.name.as_str()));

    view.execute()?;
    while let Some(row) = view.fetch()? {
        for (i, col) in columns.iter().enumerate() {
            let value = match col.ctype {
                ColumnType::Integer => match row.integer(i)? {
                    Some(v) => v.to_string(),
                    None => NULL_TEXT.to_string(),
                },
                ColumnType::String => row.string(i)?,
                ColumnType::Stream => {
                    return Err(MsiError::UnsupportedColumn {
                        table: table_name,
                        column: col.name.clone(),
                    })
                }
            };
            w.field(&value, i);
        }
        w.endline();
    }
    Ok(w.written())
}

/// Walk the 20 well-known summary slots and format the defined ones.
/// Structurally empty slots are never queried; slots whose retrieved tag is
/// `VT_EMPTY` emit no pair; an unknown tag is a defect.
pub(crate) fn collect_property_pairs(summary: &dyn SummaryInfo) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for (index, slot) in PROPERTY_NAMES.iter().enumerate() {
        let name = match slot {
            Some(name) => *name,
            None => continue,
        };
        let prop = summary.property(index)?;
        let value = match prop.type_tag {
            VT_EMPTY => continue,
            VT_I2 | VT_I4 => prop.int_value.to_string(),
            VT_FILETIME => format_filetime(prop.file_time),
            VT_LPSTR => prop.string_value,
            other => return Err(MsiError::UnsupportedPropertyType(other)),
        };
        pairs.push((name.to_string(), value));
    }
    Ok(pairs)
}
