//! Centralized configuration and builder for msiview sessions.
//!
//! Goals:
//! - Single place for tunables instead of scattered env lookups.
//! - MsiViewConfig::from_env() reads MSIVIEW_* variables; the fluent
//!   builder overrides individual fields for embedding hosts and tests.

use std::fmt;

/// Per-session configuration, consumed at open time.
#[derive(Clone, Debug)]
pub struct MsiViewConfig {
    /// Expose the document-summary property list as the first entry.
    /// Env: MSIVIEW_SUMMARY (default true; "0|false|off|no" => false)
    pub include_summary: bool,

    /// Chunk size for extraction streaming, in bytes.
    /// Env: MSIVIEW_CHUNK_BYTES (default 4096)
    pub chunk_bytes: usize,
}

impl Default for MsiViewConfig {
    fn default() -> Self {
        Self {
            include_summary: true,
            chunk_bytes: 4096,
        }
    }
}

impl MsiViewConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("MSIVIEW_SUMMARY") {
            let s = v.trim().to_ascii_lowercase();
            cfg.include_summary = !(s == "0" || s == "false" || s == "off" || s == "no");
        }

        if let Ok(v) = std::env::var("MSIVIEW_CHUNK_BYTES") {
            if let Ok(n) = v.trim().parse::<usize>() {
                if n > 0 {
                    cfg.chunk_bytes = n;
                }
            }
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_include_summary(mut self, on: bool) -> Self {
        self.include_summary = on;
        self
    }

    pub fn with_chunk_bytes(mut self, bytes: usize) -> Self {
        self.chunk_bytes = bytes;
        self
    }
}

impl fmt::Display for MsiViewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MsiViewConfig {{ include_summary: {}, chunk_bytes: {} }}",
            self.include_summary, self.chunk_bytes
        )
    }
}
