//! Engine - keyspace discovery and counting
//!
//! ```text
//! Connection ── Arc<dyn Keyspace> ──┬── scan::scan   → Vec<KeyEntry>
//!                                   └── count::count → KeyCount
//! ```
//!
//! Both engines are plain async functions; the TUI scheduler runs them on
//! tokio tasks and turns their results into messages.

pub mod connection;
pub mod count;
pub mod entry;
pub mod keyspace;
pub mod scan;
pub mod value;

pub use connection::Connection;
pub use count::{count, KeyCount, MAX_SCAN_COUNT};
pub use entry::{humanize_bytes, KeyEntry};
pub use keyspace::{Cluster, FoundKey, Keyspace, Standalone};
pub use scan::{scan, ScanRequest};
pub use value::ValueKind;
