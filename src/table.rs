//! table - column typing and per-table classification.
//!
//! A column type is declared by a short tag: the first character selects the
//! kind (`i` integer, `s`/`l` string, `v` stream, case-insensitive), trailing
//! digits give the declared size for bounded types. A table whose first
//! stream-typed column is accompanied by at least one string-typed column is
//! "stream-bearing": each of its rows becomes a virtual file, named from the
//! first string column. Everything else is a plain table, rendered as CSV.

use log::debug;

use crate::errors::{MsiError, Result};
use crate::source::TableView;

/// Reserved name of the table whose rows alias other tables' stream content.
pub const STREAMS_TABLE: &str = "_Streams";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    String,
    Stream,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub ctype: ColumnType,
    /// Declared size from the tag digits; integers default to 4.
    pub size: u32,
}

impl Column {
    /// Parse a column from its name and type tag (e.g. `i2`, `s72`, `l0`, `v0`).
    pub fn parse(table: &str, name: &str, tag: &str) -> Result<Column> {
        let mut chars = tag.chars();
        let kind = chars
            .next()
            .ok_or_else(|| MsiError::schema(table, format!("empty type tag for column '{name}'")))?;
        let (ctype, default_size) = match kind.to_ascii_lowercase() {
            'i' => (ColumnType::Integer, 4),
            's' | 'l' => (ColumnType::String, 0),
            'v' => (ColumnType::Stream, 0),
            other => {
                return Err(MsiError::schema(
                    table,
                    format!("unknown type tag '{other}' for column '{name}'"),
                ))
            }
        };
        let digits = chars.as_str();
        let size = if digits.is_empty() {
            default_size
        } else {
            digits.parse::<u32>().map_err(|_| {
                MsiError::schema(table, format!("bad size in type tag '{tag}' for column '{name}'"))
            })?
        };
        Ok(Column {
            name: name.to_string(),
            ctype,
            size,
        })
    }
}

pub struct Table {
    name: String,
    columns: Vec<Column>,
    stream_column: Option<usize>,
    name_column: Option<usize>,
    is_alias_table: bool,
    pub(crate) view: Box<dyn TableView>,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("stream_column", &self.stream_column)
            .field("name_column", &self.name_column)
            .field("is_alias_table", &self.is_alias_table)
            .finish_non_exhaustive()
    }
}

impl Table {
    /// Fetch the schema from the view, parse and classify it. Fails with a
    /// schema error on mismatched name/type lists, zero columns, a malformed
    /// tag, or a stream column without any string column to name its rows.
    pub fn load(name: &str, mut view: Box<dyn TableView>) -> Result<Table> {
        let raw = view.columns()?;
        if raw.names.len() != raw.type_tags.len() {
            return Err(MsiError::schema(
                name,
                format!(
                    "column name/type count mismatch ({} names, {} types)",
                    raw.names.len(),
                    raw.type_tags.len()
                ),
            ));
        }
        if raw.names.is_empty() {
            return Err(MsiError::schema(name, "table has no columns"));
        }

        let mut columns = Vec::with_capacity(raw.names.len());
        for (col_name, tag) in raw.names.iter().zip(raw.type_tags.iter()) {
            columns.push(Column::parse(name, col_name, tag)?);
        }

        // First stream column, then (only if one exists) the first string
        // column as the naming source.
        let stream_column = columns.iter().position(|c| c.ctype == ColumnType::Stream);
        let name_column = match stream_column {
            Some(_) => columns.iter().position(|c| c.ctype == ColumnType::String),
            None => None,
        };
        if stream_column.is_some() && name_column.is_none() {
            return Err(MsiError::schema(
                name,
                "stream column present but no string column to name rows",
            ));
        }

        debug!(
            "table '{}': {} columns, stream={:?}, name={:?}",
            name,
            columns.len(),
            stream_column,
            name_column
        );

        Ok(Table {
            name: name.to_string(),
            columns,
            stream_column,
            name_column,
            is_alias_table: name == STREAMS_TABLE,
            view,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[inline]
    pub fn stream_column(&self) -> Option<usize> {
        self.stream_column
    }

    #[inline]
    pub fn name_column(&self) -> Option<usize> {
        self.name_column
    }

    /// Both a payload column and a naming column: one file per row.
    #[inline]
    pub fn is_stream_bearing(&self) -> bool {
        self.stream_column.is_some() && self.name_column.is_some()
    }

    #[inline]
    pub fn is_alias_table(&self) -> bool {
        self.is_alias_table
    }

    /// Split borrow: the row cursor and the column list at the same time.
    pub(crate) fn parts(&mut self) -> (&mut dyn TableView, &[Column]) {
        (self.view.as_mut(), &self.columns)
    }
}
