use msiview::config::MsiViewConfig;
use msiview::mem::{MemCell, MemSource, MemSummary, MemTable};
use msiview::session::Session;
use msiview::source::{RawProperty, VT_FILETIME, VT_I2, VT_I4, VT_LPSTR};
use msiview::util::filetime_from_unix_secs;

fn str_prop(value: &str) -> RawProperty {
    RawProperty {
        type_tag: VT_LPSTR,
        string_value: value.to_string(),
        ..RawProperty::empty()
    }
}

fn int_prop(tag: u32, value: i32) -> RawProperty {
    RawProperty {
        type_tag: tag,
        int_value: value,
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

fn property_table() -> MemTable {
    MemTable::new("Property")
        .column("Property", "s72")
        .column("Value", "l0")
        .row(vec![
            MemCell::Str("ProductName".into()),
            MemCell::Str("Demo".into()),
        ])
}

#[test]
fn summary_is_the_first_entry_and_renders_defined_slots() {
    let summary = MemSummary::new()
        .set(1, int_prop(VT_I2, 1252))
        .set(2, str_prop("Demo Title"))
        .set(11, time_prop(0))
        .set(12, time_prop(filetime_from_unix_secs(1_690_201_845)))
        .set(14, int_prop(VT_I4, 7));
    let source = MemSource::new()
        .with_table(property_table())
        .with_summary(summary);

    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    let entry = s.get_next().unwrap().unwrap();
    assert_eq!(entry.name, "_SummaryInformation.csv");

    let mut sink = Vec::new();
    s.extract_last(&mut sink, &mut |_| true).unwrap();
    assert_eq!(entry.size, sink.len() as u64);

    let mut expected = vec![0xEFu8, 0xBB, 0xBF];
    expected.extend_from_slice(b"\"Name\",\"Value\"\r\n");
    expected.extend_from_slice(b"\"Codepage\",\"1252\"\r\n");
    expected.extend_from_slice(b"\"Title\",\"Demo Title\"\r\n");
    expected.extend_from_slice(b"\"Last Printed\",\"N/A\"\r\n");
    expected.extend_from_slice(b"\"Create Time / Date\",\"2023-07-24 12:30:45\"\r\n");
    expected.extend_from_slice(b"\"Page Count\",\"7\"\r\n");
    assert_eq!(sink, expected);

    // The plain table still follows.
    let entry = s.get_next().unwrap().unwrap();
    assert_eq!(entry.name, "Property.csv");
    assert!(s.get_next().unwrap().is_none());
}

#[test]
fn summary_can_be_disabled_by_config() {
    let source = MemSource::new()
        .with_table(property_table())
        .with_summary(MemSummary::new().set(2, str_prop("Demo")));
    let cfg = MsiViewConfig::default().with_include_summary(false);
    let mut s = Session::new(Box::new(source), cfg);
    let entry = s.get_next().unwrap().unwrap();
    assert_eq!(entry.name, "Property.csv");
    assert!(s.get_next().unwrap().is_none());
}

#[test]
fn database_without_summary_starts_with_tables() {
    let source = MemSource::new().with_table(property_table());
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    let entry = s.get_next().unwrap().unwrap();
    assert_eq!(entry.name, "Property.csv");
}

#[test]
fn unsupported_property_tag_skips_the_summary_entry() {
    let summary = MemSummary::new().set(
        2,
        RawProperty {
            type_tag: 99,
            ..RawProperty::empty()
        },
    );
    let source = MemSource::new()
        .with_table(property_table())
        .with_summary(summary);

    // The summary's size cannot resolve, so enumeration skips it and the
    // session keeps going with the table entries.
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    let entry = s.get_next().unwrap().unwrap();
    assert_eq!(entry.name, "Property.csv");
    assert!(s.get_next().unwrap().is_none());
}

#[test]
fn fully_empty_summary_renders_header_only() {
    let source = MemSource::new()
        .with_table(property_table())
        .with_summary(MemSummary::new());
    let mut s = Session::new(Box::new(source), MsiViewConfig::default());
    let entry = s.get_next().unwrap().unwrap();
    assert_eq!(entry.name, "_SummaryInformation.csv");

    let mut sink = Vec::new();
    s.extract_last(&mut sink, &mut |_| true).unwrap();
    let mut expected = vec![0xEFu8, 0xBB, 0xBF];
    expected.extend_from_slice(b"\"Name\",\"Value\"\r\n");
    assert_eq!(sink, expected);
}
