//! TUI Module - the interactive viewer
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       UI LAYER (ui.rs, widgets/)                    │
//! │  Pure rendering from Session. No business logic.                    │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ &Session
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      DOMAIN LAYER (state.rs)                        │
//! │  Session::update(Message) -> Vec<Command>. Single owner, no IO.     │
//! └─────────────────────────────────────────────────────────────────────┘
//!                   ▲ Message                    │ Command
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │               CONNECTOR LAYER (scheduler.rs, events.rs)             │
//! │  Tokio tasks: tick, spinner, scan, count, export, terminal input.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

mod app;
mod events;
mod scheduler;
mod state;
mod theme;
mod ui;

pub mod message;
pub mod widgets;

pub use app::App;
pub use events::Action;
pub use message::{Command, Message};
pub use scheduler::{clock_now, Scheduler};
pub use state::{Mode, PaneLayout, Session, NO_SELECTION, SEARCH_PLACEHOLDER};
pub use theme::Theme;

use crate::config::Settings;
use crate::engine::Connection;
use crate::error::Result;

/// Run the viewer until the user quits.
pub async fn run(connection: Connection, settings: &Settings) -> Result<()> {
    App::new(settings).run(connection).await
}
