//! session/discover - lazy multi-step discovery: names, tables, files.
//!
//! Failure policy per table and per row: log and skip, keep the session.
//! Only collaborator failures during the name listing itself propagate.

use log::{debug, warn};

use crate::errors::Result;
use crate::file::{TableId, VirtualFile};
use crate::names::{make_file_safe, split_extension};
use crate::session::{DiscoveryState, Session};
use crate::table::{Table, STREAMS_TABLE};

impl Session {
    /// Drive discovery forward to the materialized state. Idempotent; each
    /// completed step is skipped on later calls.
    pub fn discover(&mut self) -> Result<()> {
        if self.state == DiscoveryState::Start {
            self.load_table_names()?;
            self.state = DiscoveryState::NamesLoaded;
        }
        if self.state == DiscoveryState::NamesLoaded {
            self.load_tables();
            self.state = DiscoveryState::TablesLoaded;
        }
        if self.state == DiscoveryState::TablesLoaded {
            self.materialize_files();
            self.state = DiscoveryState::FilesMaterialized;
        }
        Ok(())
    }

    /// Primary name list from the source, deduplicated case-insensitively
    /// with order preserved; the reserved streams table is appended when its
    /// view opens even though the primary list omits it. An empty result is
    /// a valid empty session.
    fn load_table_names(&mut self) -> Result<()> {
        let mut names: Vec<String> = Vec::new();
        for name in self.source.table_names()? {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                names.push(name);
            }
        }

        if !names.iter().any(|n| n.eq_ignore_ascii_case(STREAMS_TABLE))
            && self.source.open_view(STREAMS_TABLE).is_ok()
        {
            names.push(STREAMS_TABLE.to_string());
        }

        debug!("discovered {} table name(s)", names.len());
        self.table_names = names;
        Ok(())
    }

    /// Open, load and classify every named table. Tables that cannot be
    /// opened or carry malformed schemas are skipped.
    fn load_tables(&mut self) {
        let names = self.table_names.clone();
        for name in names {
            let view = match self.source.open_view(&name) {
                Ok(view) => view,
                Err(err) => {
                    warn!("table '{}': cannot open view: {}", name, err);
                    continue;
                }
            };
            match Table::load(&name, view) {
                Ok(table) => self.tables.push(table),
                Err(err) => warn!("skipping table '{}': {}", name, err),
            }
        }
        debug!("loaded {} table(s)", self.tables.len());
    }

    /// One PropertyCsv (summary first, when present and enabled), then per
    /// table in discovery order: one file per row for stream-bearing tables,
    /// one TableCsv for plain tables.
    fn materialize_files(&mut self) {
        if self.config.include_summary {
            match self.source.open_summary() {
                Ok(Some(summary)) => {
                    let name = self.allocate_name(None, "_SummaryInformation", ".csv");
                    self.files.push(VirtualFile::property_csv(name, summary));
                }
                Ok(None) => {}
                Err(err) => warn!("document summary unavailable: {}", err),
            }
        }

        for tid in 0..self.tables.len() {
            if self.tables[tid].is_stream_bearing() {
                if let Err(err) = self.load_stream_files(tid) {
                    warn!(
                        "table '{}': stream rows failed: {}",
                        self.tables[tid].name(),
                        err
                    );
                }
            } else {
                let base = self.tables[tid].name().to_string();
                let name = self.allocate_name(None, &base, ".csv");
                self.files.push(VirtualFile::table_csv(name, tid));
            }
        }
        debug!("materialized {} file(s)", self.files.len());
    }

    /// One virtual file per fetched row. Alias-table rows whose name carries
    /// a `.` try to resolve to an existing entry first; on a miss they fall
    /// back to normal stream naming, whatever the discovery order was.
    fn load_stream_files(&mut self, tid: TableId) -> Result<()> {
        let table_name = self.tables[tid].name().to_string();
        let name_column = match self.tables[tid].name_column() {
            Some(column) => column,
            None => return Ok(()),
        };
        let is_alias_table = self.tables[tid].is_alias_table();

        self.tables[tid].view.execute()?;
        loop {
            let row = match self.tables[tid].view.fetch()? {
                Some(row) => row,
                None => break,
            };
            let raw_name = match row.string(name_column) {
                Ok(name) => name,
                Err(err) => {
                    warn!("table '{}': row without readable name: {}", table_name, err);
                    continue;
                }
            };

            if is_alias_table {
                if let Some(dot) = raw_name.find('.') {
                    // "Binary.icon" refers to content stored as "Binary\icon".
                    let mut ref_name = raw_name.clone();
                    ref_name.replace_range(dot..dot + 1, "\\");
                    if let Some(target) = self.find_file_ci(&ref_name) {
                        let suffix = &raw_name[dot + 1..];
                        let (base, ext) = split_extension(suffix);
                        let display = self.allocate_name(Some(&table_name), base, ext);
                        self.files.push(VirtualFile::alias(display, tid, target));
                        continue;
                    }
                }
            }

            let safe = make_file_safe(&raw_name);
            let (base, ext) = split_extension(&safe);
            let display = self.allocate_name(Some(&table_name), base, ext);
            self.files.push(VirtualFile::stream(display, tid, row));
        }
        Ok(())
    }
}
