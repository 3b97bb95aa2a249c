//! msiview - read-only projection of an MSI-style installer database into a
//! flat, enumerable collection of uniquely-named virtual files.
//!
//! The database engine itself is an external collaborator behind the traits
//! in [`source`]; this crate owns the projection: table discovery and
//! classification, stream aliasing, deterministic unique naming, lazy
//! size/content materialization, CSV rendering of plain tables and the
//! document summary, and the session/handle lifecycle consumed by an
//! archive-style list/extract protocol.

// Base modules
pub mod config;
pub mod errors;
pub mod source;
pub mod util;

// Projection core
pub mod csv;    // two-pass CSV renderer
pub mod names;  // unique display-name allocation
pub mod table;  // column typing + classification
pub mod file;   // virtual entries with lazy size/content

// Session layer (folder with mod.rs)
pub mod session; // src/session/{mod,discover,extract}.rs

// Host-facing surface
pub mod lock;
pub mod manager;

// Concrete sources (fixtures, CLI)
pub mod json;
pub mod mem;

// Convenience re-exports
pub use config::MsiViewConfig;
pub use errors::{MsiError, Result};
pub use manager::{SessionHandle, SessionManager};
pub use session::{Entry, ExtractStatus, Session, ATTR_ARCHIVE};
