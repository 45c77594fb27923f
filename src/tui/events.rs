//! Event Handling - terminal input to actions
//!
//! Keys map to an [`Action`] according to the current mode; the session
//! decides what each action does. The reader task forwards raw terminal
//! events into the message channel so input never waits on a scan.

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tui_input::InputRequest;

use super::message::Message;

/// Lines scrolled per mouse wheel notch
pub const WHEEL_STEP: i32 = 3;

/// Actions that can be triggered by user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Browse
    Reload,
    Search,
    Export,
    NextScanPage,
    PrevScanPage,
    SelectPrev,
    SelectNext,
    ListPagePrev,
    ListPageNext,
    DetailPageUp,
    DetailPageDown,
    DetailScroll(i32),

    // Search / Export prompt
    Commit,
    Cancel,
    Edit(InputRequest),

    None,
}

/// Ctrl+C quits from every mode.
pub fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Keys while browsing the list
pub fn browse_action(key: KeyEvent) -> Action {
    if is_quit(&key) {
        return Action::Quit;
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('r')) => Action::Reload,
        (KeyModifiers::NONE, KeyCode::Char('s')) => Action::Search,
        (KeyModifiers::NONE, KeyCode::Char('e')) => Action::Export,
        (KeyModifiers::NONE, KeyCode::Char('n')) => Action::NextScanPage,
        (KeyModifiers::NONE, KeyCode::Char('p')) => Action::PrevScanPage,

        (_, KeyCode::Up) => Action::SelectPrev,
        (_, KeyCode::Down) => Action::SelectNext,
        (_, KeyCode::Left) => Action::ListPagePrev,
        (_, KeyCode::Right) => Action::ListPageNext,

        (_, KeyCode::PageUp) => Action::DetailPageUp,
        (_, KeyCode::PageDown) => Action::DetailPageDown,

        _ => Action::None,
    }
}

/// Keys while the search or export prompt has focus
pub fn prompt_action(key: KeyEvent) -> Action {
    if is_quit(&key) {
        return Action::Quit;
    }

    let request = match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => return Action::Cancel,
        (_, KeyCode::Enter) => return Action::Commit,

        (KeyModifiers::CONTROL, KeyCode::Backspace) | (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
            InputRequest::DeletePrevWord
        }
        (KeyModifiers::CONTROL, KeyCode::Left) => InputRequest::GoToPrevWord,
        (KeyModifiers::CONTROL, KeyCode::Right) => InputRequest::GoToNextWord,
        (KeyModifiers::CONTROL, KeyCode::Char('a')) => InputRequest::GoToStart,
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => InputRequest::GoToEnd,
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => InputRequest::DeleteLine,
        (KeyModifiers::CONTROL, KeyCode::Char('k')) => InputRequest::DeleteTillEnd,

        (_, KeyCode::Backspace) => InputRequest::DeletePrevChar,
        (_, KeyCode::Delete) => InputRequest::DeleteNextChar,
        (_, KeyCode::Left) => InputRequest::GoToPrevChar,
        (_, KeyCode::Right) => InputRequest::GoToNextChar,
        (_, KeyCode::Home) => InputRequest::GoToStart,
        (_, KeyCode::End) => InputRequest::GoToEnd,

        (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            InputRequest::InsertChar(c)
        }

        _ => return Action::None,
    };
    Action::Edit(request)
}

/// Mouse wheel scrolls the detail pane
pub fn mouse_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollUp => Action::DetailScroll(-WHEEL_STEP),
        MouseEventKind::ScrollDown => Action::DetailScroll(WHEEL_STEP),
        _ => Action::None,
    }
}

/// Key releases (reported on some platforms) are not actions.
pub fn is_press(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
}

/// Forward terminal events into the message channel until it closes.
pub fn spawn_reader(tx: mpsc::Sender<Message>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(event) = events.next().await {
            let message = match event {
                Ok(Event::Key(key)) => Message::Key(key),
                Ok(Event::Mouse(mouse)) => Message::Mouse(mouse),
                Ok(Event::Resize(width, height)) => Message::Resize { width, height },
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "terminal input failed");
                    break;
                }
            };
            if tx.send(message).await.is_err() {
                break;
            }
        }
    })
}
