//! util - FILETIME helpers shared by the summary renderer and the sources.
//!
//! Timestamps travel through the collaborator interface as FILETIME values
//! (100 ns ticks since 1601-01-01 UTC, 0 = absent). Rendering is fixed to
//! `%Y-%m-%d %H:%M:%S` UTC so that repeated enumerations of the same database
//! produce byte-identical output.

use chrono::{TimeZone, Utc};

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET_SECS: i64 = 11_644_473_600;

/// Ticks (100 ns) per second.
const TICKS_PER_SEC: u64 = 10_000_000;

/// Convert a FILETIME tick count to Unix seconds (floor).
#[inline]
pub fn filetime_to_unix_secs(ft: u64) -> i64 {
    (ft / TICKS_PER_SEC) as i64 - FILETIME_UNIX_OFFSET_SECS
}

/// Convert Unix seconds to FILETIME ticks. Pre-1601 times clamp to 0.
#[inline]
pub fn filetime_from_unix_secs(secs: i64) -> u64 {
    let shifted = secs.saturating_add(FILETIME_UNIX_OFFSET_SECS);
    if shifted <= 0 {
        0
    } else {
        (shifted as u64).saturating_mul(TICKS_PER_SEC)
    }
}

/// Render a FILETIME as `"<date> <time>"`, or the literal `N/A` when absent.
pub fn format_filetime(ft: u64) -> String {
    if ft == 0 {
        return "N/A".to_string();
    }
    match Utc.timestamp_opt(filetime_to_unix_secs(ft), 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_filetime_is_na() {
        assert_eq!(format_filetime(0), "N/A");
    }

    #[test]
    fn unix_epoch_roundtrip() {
        let ft = filetime_from_unix_secs(0);
        assert_eq!(filetime_to_unix_secs(ft), 0);
        assert_eq!(format_filetime(ft), "1970-01-01 00:00:00");
    }

    #[test]
    fn known_date_formats() {
        // 2023-07-24 12:30:45 UTC
        let secs = 1_690_201_845;
        let ft = filetime_from_unix_secs(secs);
        assert_eq!(format_filetime(ft), "2023-07-24 12:30:45");
    }

    #[test]
    fn pre_epoch_clamps() {
        assert_eq!(filetime_from_unix_secs(-FILETIME_UNIX_OFFSET_SECS - 10), 0);
    }
}
