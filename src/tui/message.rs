//! Messages and commands
//!
//! Everything the session reacts to arrives as a [`Message`] on one channel:
//! terminal input from the reader task and completions from the scheduler.
//! [`Command`]s are the work the session asks for in return.

use std::path::PathBuf;

use crossterm::event::{KeyEvent, MouseEvent};

use crate::engine::{KeyCount, KeyEntry, ScanRequest};
use crate::error::ViewerError;

#[derive(Debug)]
pub enum Message {
    // Scheduler completions
    /// Clock tick, formatted `YYYY-MM-DD HH:MM:SS`
    Tick(String),
    SpinnerFrame,
    ScanCompleted(Vec<KeyEntry>),
    CountCompleted(KeyCount),
    /// Export outcome: the written path, or the error
    Exported(Result<String, ViewerError>),
    /// A scan or count failed; carries the status text
    Failed(String),

    // Terminal input
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Deliver a [`Message::Tick`] in one second
    Tick,
    /// Deliver a [`Message::SpinnerFrame`] after one frame
    Spinner,
    Scan(ScanRequest),
    Count { pattern: String },
    Export { path: PathBuf, contents: String },
    Quit,
}
