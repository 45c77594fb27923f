//! Redis Viewer - browse Redis keys and values in the terminal

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod store;
pub mod tui;

pub use config::{Config, Settings, Topology};
pub use engine::{Connection, KeyCount, KeyEntry, Keyspace, ScanRequest};
pub use error::{FixSuggestion, ViewerError};
