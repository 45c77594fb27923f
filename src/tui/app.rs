//! TUI Application - terminal setup and the event loop

use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use super::events;
use super::message::{Command, Message};
use super::scheduler::Scheduler;
use super::state::Session;
use super::theme::Theme;
use super::ui;
use crate::config::Settings;
use crate::engine::Connection;
use crate::error::{Result, ViewerError};

/// Pending messages between producers and the loop
const MESSAGE_BUFFER: usize = 64;

type Backend = CrosstermBackend<Stdout>;

pub struct App {
    terminal: Option<Terminal<Backend>>,
    session: Session,
    theme: Theme,
}

fn tui_error(e: io::Error) -> ViewerError {
    ViewerError::Tui {
        reason: e.to_string(),
    }
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        Self {
            terminal: None,
            session: Session::new(settings.page_limit),
            theme: Theme::new(),
        }
    }

    /// Take over the terminal, run until quit, then restore it and close the
    /// connection.
    pub async fn run(mut self, connection: Connection) -> Result<()> {
        self.setup_terminal()?;

        let (tx, mut rx) = mpsc::channel(MESSAGE_BUFFER);
        let scheduler = Scheduler::new(connection.keyspace(), tx.clone());
        let reader = events::spawn_reader(tx);

        if let Some(terminal) = &self.terminal {
            let size = terminal.size().map_err(tui_error)?;
            self.session.update(Message::Resize {
                width: size.width,
                height: size.height,
            });
        }
        for command in self.session.init() {
            scheduler.dispatch(command);
        }

        let result = self.event_loop(&scheduler, &mut rx).await;

        reader.abort();
        self.restore_terminal()?;
        connection.close();
        result
    }

    async fn event_loop(
        &mut self,
        scheduler: &Scheduler,
        rx: &mut mpsc::Receiver<Message>,
    ) -> Result<()> {
        loop {
            self.draw()?;

            let Some(message) = rx.recv().await else {
                tracing::warn!("message channel closed");
                break;
            };

            for command in self.session.update(message) {
                match command {
                    Command::Quit => {}
                    other => scheduler.dispatch(other),
                }
            }

            if self.session.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let session = &self.session;
        let theme = &self.theme;
        if let Some(terminal) = self.terminal.as_mut() {
            terminal
                .draw(|frame| ui::render(frame, session, theme))
                .map_err(tui_error)?;
        }
        Ok(())
    }

    fn setup_terminal(&mut self) -> Result<()> {
        enable_raw_mode().map_err(tui_error)?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(tui_error)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).map_err(tui_error)?;
        self.terminal = Some(terminal);
        Ok(())
    }

    /// Leave the alternate screen. Safe to call twice.
    fn restore_terminal(&mut self) -> Result<()> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(());
        };
        disable_raw_mode().map_err(tui_error)?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .map_err(tui_error)?;
        terminal.show_cursor().map_err(tui_error)?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Error paths skip the explicit restore
        if let Err(e) = self.restore_terminal() {
            tracing::error!(error = %e, "failed to restore terminal");
        }
    }
}
