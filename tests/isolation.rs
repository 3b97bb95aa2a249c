//! Per-table and per-row failures stay isolated: the offending item is
//! skipped and the rest of the session keeps working.

use msiview::config::MsiViewConfig;
use msiview::mem::{MemCell, MemSource, MemTable};
use msiview::session::Session;

fn collect(session: &mut Session) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(entry) = session.get_next().unwrap() {
        out.push(entry.name);
    }
    out
}

#[test]
fn malformed_type_tag_skips_only_that_table() {
    let source = MemSource::new()
        .with_table(
            MemTable::new("Broken")
                .column("Weird", "q4")
                .row(vec![MemCell::Int(1)]),
        )
        .with_table(
            MemTable::new("Good")
                .column("Id", "i2")
                .row(vec![MemCell::Int(1)]),
        );
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    assert_eq!(collect(&mut s), vec!["Good.csv"]);
}

#[test]
fn stream_without_name_column_skips_only_that_table() {
    let source = MemSource::new()
        .with_table(
            MemTable::new("Nameless")
                .column("Seq", "i4")
                .column("Data", "v0")
                .row(vec![MemCell::Int(1), MemCell::Stream(vec![1, 2])]),
        )
        .with_table(
            MemTable::new("Binary")
                .column("Name", "s72")
                .column("Data", "v0")
                .row(vec![MemCell::Str("ok".into()), MemCell::Stream(vec![3])]),
        );
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    assert_eq!(collect(&mut s), vec!["Binary\\ok"]);
}

#[test]
fn row_with_unreadable_name_is_skipped() {
    // The second row carries stream data in its name column; reading the
    // name fails and only that row disappears.
    let source = MemSource::new().with_table(
        MemTable::new("Binary")
            .column("Name", "s72")
            .column("Data", "v0")
            .row(vec![MemCell::Str("first".into()), MemCell::Stream(vec![1])])
            .row(vec![MemCell::Stream(vec![0]), MemCell::Stream(vec![2])])
            .row(vec![MemCell::Str("third".into()), MemCell::Stream(vec![3])]),
    );
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    assert_eq!(collect(&mut s), vec!["Binary\\first", "Binary\\third"]);
}

#[test]
fn table_with_zero_rows_still_renders_header() {
    let source = MemSource::new().with_table(
        MemTable::new("Empty").column("Id", "i2").column("Name", "s72"),
    );
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    let entry = s.get_next().unwrap().unwrap();
    assert_eq!(entry.name, "Empty.csv");

    let mut sink = Vec::new();
    s.extract_last(&mut sink, &mut |_| true).unwrap();
    let mut expected = vec![0xEFu8, 0xBB, 0xBF];
    expected.extend_from_slice(b"\"Id\",\"Name\"\r\n");
    assert_eq!(sink, expected);
}

#[test]
fn tables_differing_only_in_case_are_listed_once() {
    let source = MemSource::new()
        .with_table(MemTable::new("Media").column("DiskId", "i2"))
        .with_table(MemTable::new("MEDIA").column("DiskId", "i2"));
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    assert_eq!(collect(&mut s), vec!["Media.csv"]);
}

#[test]
fn table_colliding_with_summary_name_resolves() {
    use msiview::mem::MemSummary;
    use msiview::source::{RawProperty, VT_LPSTR};

    // The summary entry claims "_SummaryInformation.csv" first; a real table
    // of the same name falls back to the numbered variant.
    let source = MemSource::new()
        .with_table(MemTable::new("_SummaryInformation").column("Id", "i2"))
        .with_summary(MemSummary::new().set(
            2,
            RawProperty {
                type_tag: VT_LPSTR,
                string_value: "Demo".to_string(),
                ..RawProperty::empty()
            },
        ));
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    assert_eq!(
        collect(&mut s),
        vec!["_SummaryInformation.csv", "_SummaryInformation_001.csv"]
    );
}
