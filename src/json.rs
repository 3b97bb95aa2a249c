//! json - JSON-described databases: on-disk fixtures and the CLI's opener.
//!
//! Format:
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "Binary",
//!       "columns": [{"name": "Name", "type": "s72"},
//!                   {"name": "Data", "type": "v0"}],
//!       "rows": [["icon", {"stream": "AAEC"}]]
//!     },
//!     {"name": "_Streams", "hidden": true, "columns": [...], "rows": [...]}
//!   ],
//!   "summary": {"title": "Demo", "page_count": 3, "create_time": 133350720000000000}
//! }
//! ```
//! Cells: JSON null is the database null sentinel, numbers are integers,
//! strings are text, `{"stream": "<base64>"}` is a binary payload. `hidden`
//! keeps a table out of the primary name list while its view still opens.
//! Summary times are FILETIME tick counts.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::errors::{MsiError, Result};
use crate::mem::{MemCell, MemSource, MemSummary, MemTable};
use crate::source::{
    DataSource, RawProperty, SourceOpener, VT_FILETIME, VT_I2, VT_I4, VT_LPSTR,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDatabase {
    #[serde(default)]
    pub tables: Vec<JsonTable>,
    #[serde(default)]
    pub summary: Option<JsonSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTable {
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    pub columns: Vec<JsonColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
}

/// The named summary slots; absent fields stay structurally empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonSummary {
    pub codepage: Option<i32>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub comments: Option<String>,
    pub template: Option<String>,
    pub last_saved_by: Option<String>,
    pub revision_number: Option<String>,
    pub last_printed: Option<u64>,
    pub create_time: Option<u64>,
    pub last_save_time: Option<u64>,
    pub page_count: Option<i32>,
    pub word_count: Option<i32>,
    pub character_count: Option<i32>,
    pub creating_application: Option<String>,
    pub security: Option<i32>,
}

fn int_prop(tag: u32, value: i32) -> RawProperty {
    RawProperty {
        type_tag: tag,
        int_value: value,
        ..RawProperty::empty()
    }
}

fn str_prop(value: String) -> RawProperty {
    RawProperty {
        type_tag: VT_LPSTR,
        string_value: value,
        ..RawProperty::empty()
    }
}

fn time_prop(ticks: u64) -> RawProperty {
    RawProperty {
        type_tag: VT_FILETIME,
        file_time: ticks,
        ..RawProperty::empty()
    }
}

impl JsonSummary {
    fn into_mem(self) -> MemSummary {
        let slots = [
            (1, self.codepage.map(|v| int_prop(VT_I2, v))),
            (2, self.title.map(str_prop)),
            (3, self.subject.map(str_prop)),
            (4, self.author.map(str_prop)),
            (5, self.keywords.map(str_prop)),
            (6, self.comments.map(str_prop)),
            (7, self.template.map(str_prop)),
            (8, self.last_saved_by.map(str_prop)),
            (9, self.revision_number.map(str_prop)),
            (11, self.last_printed.map(time_prop)),
            (12, self.create_time.map(time_prop)),
            (13, self.last_save_time.map(time_prop)),
            (14, self.page_count.map(|v| int_prop(VT_I4, v))),
            (15, self.word_count.map(|v| int_prop(VT_I4, v))),
            (16, self.character_count.map(|v| int_prop(VT_I4, v))),
            (18, self.creating_application.map(str_prop)),
            (19, self.security.map(|v| int_prop(VT_I4, v))),
        ];
        let mut summary = MemSummary::new();
        for (index, prop) in slots {
            if let Some(prop) = prop {
                summary = summary.set(index, prop);
            }
        }
        summary
    }
}

fn convert_cell(table: &str, value: &serde_json::Value) -> Result<MemCell> {
    use serde_json::Value;
    match value {
        Value::Null => Ok(MemCell::Null),
        Value::Number(n) => {
            let v = n
                .as_i64()
                .filter(|v| i32::try_from(*v).is_ok())
                .ok_or_else(|| {
                    MsiError::UnknownFormat(format!("table '{table}': integer cell out of range"))
                })?;
            Ok(MemCell::Int(v as i32))
        }
        Value::String(s) => Ok(MemCell::Str(s.clone())),
        Value::Object(map) => match map.get("stream").and_then(|v| v.as_str()) {
            Some(encoded) => {
                let data = BASE64.decode(encoded).map_err(|err| {
                    MsiError::UnknownFormat(format!("table '{table}': bad stream base64: {err}"))
                })?;
                Ok(MemCell::Stream(data))
            }
            None => Err(MsiError::UnknownFormat(format!(
                "table '{table}': object cell without 'stream' key"
            ))),
        },
        other => Err(MsiError::UnknownFormat(format!(
            "table '{table}': unsupported cell {other}"
        ))),
    }
}

impl JsonDatabase {
    pub fn into_source(self) -> Result<MemSource> {
        let mut source = MemSource::new();
        for table in self.tables {
            let mut mem = MemTable::new(table.name.clone()).hidden(table.hidden);
            for column in &table.columns {
                mem = mem.column(column.name.clone(), column.type_tag.clone());
            }
            for row in &table.rows {
                let mut cells = Vec::with_capacity(row.len());
                for value in row {
                    cells.push(convert_cell(&table.name, value)?);
                }
                mem = mem.row(cells);
            }
            source = source.with_table(mem);
        }
        if let Some(summary) = self.summary {
            source = source.with_summary(summary.into_mem());
        }
        Ok(source)
    }
}

/// Parse `path` as a JSON database. Any read or shape problem means the file
/// is not ours: `UnknownFormat`.
pub fn load_json_database(path: &Path) -> Result<MemSource> {
    let bytes = std::fs::read(path)
        .map_err(|err| MsiError::UnknownFormat(format!("{}: {err}", path.display())))?;
    let parsed: JsonDatabase = serde_json::from_slice(&bytes)
        .map_err(|err| MsiError::UnknownFormat(format!("{}: {err}", path.display())))?;
    parsed.into_source()
}

/// `SourceOpener` over JSON databases, for the manager and the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOpener;

impl SourceOpener for JsonOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn DataSource>> {
        Ok(Box::new(load_json_database(path)?))
    }
}
