use std::fs;
use std::path::PathBuf;

use msiview::config::MsiViewConfig;
use msiview::errors::MsiError;
use msiview::json::JsonOpener;
use msiview::manager::SessionManager;
use msiview::session::ExtractStatus;

const FIXTURE: &str = r#"{
  "tables": [
    {
      "name": "Property",
      "columns": [{"name": "Property", "type": "s72"},
                  {"name": "Value", "type": "l0"}],
      "rows": [["ProductName", "Demo"]]
    },
    {
      "name": "Binary",
      "columns": [{"name": "Name", "type": "s72"},
                  {"name": "Data", "type": "v0"}],
      "rows": [["icon", {"stream": "AQIDBA=="}]]
    }
  ],
  "summary": {"title": "Demo"}
}"#;

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("msiview-{}-{}-{}.json", prefix, pid, t))
}

fn write_fixture(prefix: &str) -> PathBuf {
    let path = unique_path(prefix);
    fs::write(&path, FIXTURE).unwrap();
    path
}

fn manager() -> SessionManager {
    SessionManager::with_config(Box::new(JsonOpener), MsiViewConfig::default())
}

#[test]
fn can_handle_probes_by_opening() {
    let path = write_fixture("canhandle");
    let mgr = manager();
    assert!(mgr.can_handle(&path));
    // Probing leaves nothing open.
    assert_eq!(mgr.open_sessions(), 0);

    let garbage = unique_path("garbage");
    fs::write(&garbage, b"\x00\x01not json").unwrap();
    assert!(!mgr.can_handle(&garbage));
    assert!(!mgr.can_handle(&unique_path("missing")));

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&garbage);
}

#[test]
fn list_and_extract_through_handles() {
    let path = write_fixture("roundtrip");
    let mgr = manager();
    let handle = mgr.open_session(&path).unwrap();
    assert_eq!(mgr.open_sessions(), 1);

    let mut names = Vec::new();
    let mut icon = Vec::new();
    while let Some(entry) = mgr.get_next_entry(handle).unwrap() {
        if entry.name == "Binary\\icon" {
            let status = mgr
                .extract_last(handle, &mut icon, &mut |_| true)
                .unwrap();
            assert_eq!(status, ExtractStatus::Completed);
            assert_eq!(entry.size, icon.len() as u64);
        }
        names.push(entry.name);
    }
    assert_eq!(
        names,
        vec!["_SummaryInformation.csv", "Property.csv", "Binary\\icon"]
    );
    assert_eq!(icon, vec![1, 2, 3, 4]);

    mgr.close_session(handle).unwrap();
    assert_eq!(mgr.open_sessions(), 0);
    let _ = fs::remove_file(&path);
}

#[test]
fn closed_handles_go_stale() {
    let path = write_fixture("stale");
    let mgr = manager();
    let handle = mgr.open_session(&path).unwrap();
    mgr.close_session(handle).unwrap();

    assert!(matches!(
        mgr.get_next_entry(handle),
        Err(MsiError::InvalidHandle)
    ));
    assert!(matches!(
        mgr.close_session(handle),
        Err(MsiError::InvalidHandle)
    ));

    // The slot is reused with a fresh generation; the old handle stays dead.
    let fresh = mgr.open_session(&path).unwrap();
    assert_ne!(fresh, handle);
    assert!(matches!(
        mgr.get_next_entry(handle),
        Err(MsiError::InvalidHandle)
    ));
    assert!(mgr.get_next_entry(fresh).unwrap().is_some());
    mgr.close_session(fresh).unwrap();
    let _ = fs::remove_file(&path);
}

#[test]
fn sessions_are_independent() {
    let path = write_fixture("independent");
    let mgr = manager();
    let a = mgr.open_session(&path).unwrap();
    let b = mgr.open_session(&path).unwrap();
    assert_eq!(mgr.open_sessions(), 2);

    // Advancing one cursor does not move the other.
    let first_a = mgr.get_next_entry(a).unwrap().unwrap();
    let first_b = mgr.get_next_entry(b).unwrap().unwrap();
    assert_eq!(first_a.name, first_b.name);

    mgr.close_session(a).unwrap();
    assert!(mgr.get_next_entry(b).unwrap().is_some());
    mgr.close_session(b).unwrap();
    assert_eq!(mgr.open_sessions(), 0);
    let _ = fs::remove_file(&path);
}

#[test]
fn reopen_yields_identical_listing() {
    let path = write_fixture("reopen");
    let mgr = manager();

    let mut runs = Vec::new();
    for _ in 0..2 {
        let handle = mgr.open_session(&path).unwrap();
        let mut listing = Vec::new();
        while let Some(entry) = mgr.get_next_entry(handle).unwrap() {
            listing.push((entry.name, entry.size));
        }
        mgr.close_session(handle).unwrap();
        runs.push(listing);
    }
    assert_eq!(runs[0], runs[1]);
    let _ = fs::remove_file(&path);
}

#[test]
fn open_failure_is_unknown_format() {
    let mgr = manager();
    let err = mgr.open_session(&unique_path("nope")).unwrap_err();
    assert!(matches!(err, MsiError::UnknownFormat(_)));
}
