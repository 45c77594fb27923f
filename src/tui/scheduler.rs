//! Command Scheduler
//!
//! Runs each [`Command`] on its own tokio task and sends the outcome back as
//! a [`Message`]. Nothing here touches the session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::message::{Command, Message};
use crate::engine::{self, Keyspace};
use crate::error::ViewerError;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local time as shown in the status bar
pub fn clock_now() -> String {
    chrono::Local::now().format(CLOCK_FORMAT).to_string()
}

pub struct Scheduler {
    keyspace: Arc<dyn Keyspace>,
    tx: mpsc::Sender<Message>,
}

impl Scheduler {
    pub fn new(keyspace: Arc<dyn Keyspace>, tx: mpsc::Sender<Message>) -> Self {
        Self { keyspace, tx }
    }

    /// Start a command. Must be called from within the tokio runtime.
    pub fn dispatch(&self, command: Command) {
        match command {
            Command::Tick => self.spawn(async {
                tokio::time::sleep(TICK_INTERVAL).await;
                Message::Tick(clock_now())
            }),
            Command::Spinner => self.spawn(async {
                tokio::time::sleep(SPINNER_INTERVAL).await;
                Message::SpinnerFrame
            }),
            Command::Scan(request) => {
                let keyspace = Arc::clone(&self.keyspace);
                self.spawn(async move {
                    match engine::scan(keyspace.as_ref(), &request).await {
                        Ok(entries) => Message::ScanCompleted(entries),
                        Err(e) => Message::Failed(e.to_string()),
                    }
                })
            }
            Command::Count { pattern } => {
                let keyspace = Arc::clone(&self.keyspace);
                self.spawn(async move {
                    match engine::count(keyspace.as_ref(), &pattern).await {
                        Ok(count) => Message::CountCompleted(count),
                        Err(e) => Message::Failed(e.to_string()),
                    }
                })
            }
            Command::Export { path, contents } => self.spawn(async move {
                let shown = path.display().to_string();
                match tokio::fs::write(&path, contents.as_bytes()).await {
                    Ok(()) => {
                        tracing::info!(path = %shown, bytes = contents.len(), "exported value");
                        Message::Exported(Ok(shown))
                    }
                    Err(e) => Message::Exported(Err(ViewerError::Export {
                        path: shown,
                        reason: e.to_string(),
                    })),
                }
            }),
            Command::Quit => {}
        }
    }

    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let message = work.await;
            if tx.send(message).await.is_err() {
                tracing::debug!("message loop closed, dropping completion");
            }
        });
    }
}
