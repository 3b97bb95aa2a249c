//! csv - fixed-format CSV rendering with a two-pass (size, then fill) writer.
//!
//! Format, bit-exact:
//! - output starts with the 3-byte UTF-8 BOM,
//! - every field is wrapped in double quotes; embedded quotes are NOT escaped
//!   (kept for byte-compatibility with the original consumer of this format),
//! - fields are comma-joined, records end with CRLF,
//! - field length is the UTF-8 byte count of the value.
//!
//! Callers size a buffer once and never reallocate mid-render: run the same
//! rendering code over `CsvWriter::sizing()` to learn the exact byte count,
//! allocate, then run it again over `CsvWriter::filling(&mut buf)`.

pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

pub struct CsvWriter<'a> {
    out: Option<&'a mut [u8]>,
    pos: usize,
}

impl<'a> CsvWriter<'a> {
    /// Counting mode: advances the position without touching memory.
    pub fn sizing() -> CsvWriter<'static> {
        CsvWriter { out: None, pos: 0 }
    }

    /// Fill mode over a preallocated buffer. Bytes past the end of `out` are
    /// counted but not written.
    pub fn filling(out: &'a mut [u8]) -> CsvWriter<'a> {
        CsvWriter {
            out: Some(out),
            pos: 0,
        }
    }

    fn put(&mut self, bytes: &[u8]) {
        if let Some(out) = self.out.as_deref_mut() {
            let end = (self.pos + bytes.len()).min(out.len());
            if self.pos < end {
                let n = end - self.pos;
                out[self.pos..end].copy_from_slice(&bytes[..n]);
            }
        }
        self.pos += bytes.len();
    }

    pub fn bom(&mut self) {
        self.put(&UTF8_BOM);
    }

    /// One quoted field. `index` 0 opens a record; later indices are
    /// comma-prefixed.
    pub fn field(&mut self, value: &str, index: usize) {
        if index > 0 {
            self.put(b",");
        }
        self.put(b"\"");
        self.put(value.as_bytes());
        self.put(b"\"");
    }

    pub fn endline(&mut self) {
        self.put(b"\r\n");
    }

    /// A full record: all fields plus the CRLF terminator.
    pub fn record<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, f) in fields.into_iter().enumerate() {
            self.field(f.as_ref(), i);
        }
        self.endline();
    }

    /// Bytes emitted (or counted) so far.
    pub fn written(&self) -> usize {
        self.pos
    }
}

/// Run `render` in sizing mode, allocate exactly, run it again in fill mode.
fn render_two_pass<F: Fn(&mut CsvWriter)>(render: F) -> Vec<u8> {
    let mut sizer = CsvWriter::sizing();
    render(&mut sizer);
    let mut buf = vec![0u8; sizer.written()];
    let mut filler = CsvWriter::filling(&mut buf);
    render(&mut filler);
    buf
}

/// BOM plus the quoted header record.
pub fn render_header(columns: &[String]) -> Vec<u8> {
    render_two_pass(|w| {
        w.bom();
        w.record(columns);
    })
}

/// One quoted record without the BOM.
pub fn render_row(fields: &[String]) -> Vec<u8> {
    render_two_pass(|w| w.record(fields))
}

/// A complete name/value property list: BOM, `Name`/`Value` header, one
/// record per pair.
pub fn render_property_list(pairs: &[(String, String)]) -> Vec<u8> {
    render_two_pass(|w| {
        w.bom();
        w.record(["Name", "Value"]);
        for (name, value) in pairs {
            w.field(name, 0);
            w.field(value, 1);
            w.endline();
        }
    })
}
