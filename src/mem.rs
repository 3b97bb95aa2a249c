//! mem - in-memory data source for fixtures, tests and doc examples.
//!
//! `MemSource` is a fully owned description of a database: tables with typed
//! columns and rows of cells, plus an optional document summary. It is cheap
//! to clone, which is how tests model "reopen the same database".

use crate::errors::{MsiError, Result};
use crate::source::{
    DataSource, RawProperty, RowHandle, SummaryInfo, TableView, ViewColumns,
};

#[derive(Debug, Clone)]
pub enum MemCell {
    /// The database null sentinel.
    Null,
    Int(i32),
    Str(String),
    Stream(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct MemTable {
    pub name: String,
    /// Absent from the primary name list even though a view opens; models
    /// the reserved streams table not being listed by the catalog.
    pub hidden: bool,
    pub columns: Vec<(String, String)>,
    pub rows: Vec<Vec<MemCell>>,
}

impl MemTable {
    pub fn new<S: Into<String>>(name: S) -> Self {
        MemTable {
            name: name.into(),
            hidden: false,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn column<N: Into<String>, T: Into<String>>(mut self, name: N, tag: T) -> Self {
        self.columns.push((name.into(), tag.into()));
        self
    }

    pub fn row(mut self, cells: Vec<MemCell>) -> Self {
        self.rows.push(cells);
        self
    }
}

/// Fixed 20-slot document summary.
#[derive(Debug, Clone)]
pub struct MemSummary {
    slots: Vec<RawProperty>,
}

impl Default for MemSummary {
    fn default() -> Self {
        MemSummary {
            slots: vec![RawProperty::empty(); 20],
        }
    }
}

impl MemSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, index: usize, prop: RawProperty) -> Self {
        if index < self.slots.len() {
            self.slots[index] = prop;
        }
        self
    }
}

impl SummaryInfo for MemSummary {
    fn property(&self, index: usize) -> Result<RawProperty> {
        Ok(self
            .slots
            .get(index)
            .cloned()
            .unwrap_or_else(RawProperty::empty))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemSource {
    pub tables: Vec<MemTable>,
    pub summary: Option<MemSummary>,
}

impl MemSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: MemTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_summary(mut self, summary: MemSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

impl DataSource for MemSource {
    fn table_names(&mut self) -> Result<Vec<String>> {
        Ok(self
            .tables
            .iter()
            .filter(|t| !t.hidden)
            .map(|t| t.name.clone())
            .collect())
    }

    fn open_view(&mut self, table: &str) -> Result<Box<dyn TableView>> {
        let found = self
            .tables
            .iter()
            .find(|t| t.name == table)
            .ok_or_else(|| MsiError::Source(format!("no such table '{table}'")))?;
        Ok(Box::new(MemView {
            columns: found.columns.clone(),
            rows: found.rows.clone(),
            cursor: None,
        }))
    }

    fn open_summary(&mut self) -> Result<Option<Box<dyn SummaryInfo>>> {
        Ok(self
            .summary
            .clone()
            .map(|s| Box::new(s) as Box<dyn SummaryInfo>))
    }
}

struct MemView {
    columns: Vec<(String, String)>,
    rows: Vec<Vec<MemCell>>,
    cursor: Option<usize>,
}

impl TableView for MemView {
    fn columns(&mut self) -> Result<ViewColumns> {
        Ok(ViewColumns {
            names: self.columns.iter().map(|(n, _)| n.clone()).collect(),
            type_tags: self.columns.iter().map(|(_, t)| t.clone()).collect(),
        })
    }

    fn execute(&mut self) -> Result<()> {
        self.cursor = Some(0);
        Ok(())
    }

    fn fetch(&mut self) -> Result<Option<Box<dyn RowHandle>>> {
        let index = self
            .cursor
            .ok_or_else(|| MsiError::Source("view not executed".to_string()))?;
        match self.rows.get(index) {
            Some(row) => {
                self.cursor = Some(index + 1);
                Ok(Some(Box::new(MemRow { cells: row.clone() })))
            }
            None => Ok(None),
        }
    }
}

struct MemRow {
    cells: Vec<MemCell>,
}

impl MemRow {
    fn cell(&self, column: usize) -> Result<&MemCell> {
        self.cells
            .get(column)
            .ok_or_else(|| MsiError::Source(format!("no cell at column {column}")))
    }
}

impl RowHandle for MemRow {
    fn integer(&self, column: usize) -> Result<Option<i32>> {
        match self.cell(column)? {
            MemCell::Null => Ok(None),
            MemCell::Int(v) => Ok(Some(*v)),
            other => Err(MsiError::Source(format!(
                "column {column} is not an integer: {other:?}"
            ))),
        }
    }

    fn string(&self, column: usize) -> Result<String> {
        match self.cell(column)? {
            MemCell::Str(s) => Ok(s.clone()),
            // String reads on null/integer cells mirror the engine: empty
            // text for null, decimal text for integers.
            MemCell::Null => Ok(String::new()),
            MemCell::Int(v) => Ok(v.to_string()),
            MemCell::Stream(_) => Err(MsiError::Source(format!(
                "column {column} holds stream data"
            ))),
        }
    }

    fn stream_size(&self, column: usize) -> Result<u64> {
        match self.cell(column)? {
            MemCell::Stream(data) => Ok(data.len() as u64),
            other => Err(MsiError::Source(format!(
                "column {column} is not a stream: {other:?}"
            ))),
        }
    }

    fn read_stream(&self, column: usize, out: &mut [u8]) -> Result<usize> {
        match self.cell(column)? {
            MemCell::Stream(data) => {
                let n = data.len().min(out.len());
                out[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            other => Err(MsiError::Source(format!(
                "column {column} is not a stream: {other:?}"
            ))),
        }
    }
}
