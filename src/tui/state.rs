//! Session State - the interaction state machine
//!
//! [`Session`] owns everything the screen shows and is only touched by the
//! event loop. [`Session::update`] applies one [`Message`] and returns the
//! [`Command`]s to schedule; it never blocks and never does IO.
//!
//! ```text
//!            s                    e (with selection)
//!   Search ◄──── Browse ────────────────────► Export
//!     │  esc/enter ▲  ▲        esc/enter          │
//!     └────────────┘  └───────────────────────────┘
//! ```

use std::path::PathBuf;

use crossterm::event::{KeyEvent, MouseEvent};
use tui_input::Input;

use super::events::{self, Action};
use super::message::{Command, Message};
use super::scheduler;
use crate::engine::{KeyEntry, ScanRequest};

/// Share of the width given to the key list
pub const LIST_PROPORTION: f64 = 0.3;

pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Rows per list item: key, then description
pub const ITEM_HEIGHT: u16 = 2;

/// Border rows around a pane
const PANE_FRAME: u16 = 2;

pub const SEARCH_PLACEHOLDER: &str = "Search Key";

pub const NO_SELECTION: &str = "select a key first";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Search,
    Export,
}

/// Pane sizes derived from the terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneLayout {
    pub width: u16,
    pub height: u16,
    pub list_width: u16,
    pub detail_width: u16,
    /// Height above the status bar
    pub body_height: u16,
}

impl PaneLayout {
    pub fn compute(width: u16, height: u16) -> Self {
        let list_width = (LIST_PROPORTION * f64::from(width)) as u16;
        Self {
            width,
            height,
            list_width,
            detail_width: width.saturating_sub(list_width),
            body_height: height.saturating_sub(STATUS_BAR_HEIGHT),
        }
    }

    /// Items visible at once in the list pane
    pub fn list_page_size(&self) -> usize {
        usize::from((self.body_height.saturating_sub(PANE_FRAME) / ITEM_HEIGHT).max(1))
    }

    /// Text rows visible in the detail pane
    pub fn detail_rows(&self) -> u16 {
        self.body_height.saturating_sub(PANE_FRAME).max(1)
    }
}

pub struct Session {
    pub mode: Mode,
    pub entries: Vec<KeyEntry>,
    pub selected: Option<usize>,

    /// Search / export prompt
    pub input: Input,
    pub placeholder: String,

    /// Active scan pattern, empty for every key
    pub pattern: String,
    /// Scan page index
    pub offset: u64,
    pub limit: usize,

    pub status: String,
    /// False while a scan/count pair is outstanding
    pub ready: bool,
    pub now: String,

    pub spinner_frame: usize,
    /// A spinner message is pending
    spinner_armed: bool,

    pub detail_scroll: u16,
    pub layout: PaneLayout,
    pub should_quit: bool,
}

impl Session {
    pub fn new(limit: usize) -> Self {
        Self {
            mode: Mode::Browse,
            entries: Vec::new(),
            selected: None,
            input: Input::default(),
            placeholder: String::new(),
            pattern: String::new(),
            offset: 0,
            limit,
            status: String::new(),
            ready: false,
            now: scheduler::clock_now(),
            spinner_frame: 0,
            spinner_armed: false,
            detail_scroll: 0,
            layout: PaneLayout::default(),
            should_quit: false,
        }
    }

    /// Work to start with: the clock, the spinner, and the first page.
    pub fn init(&mut self) -> Vec<Command> {
        let mut commands = vec![Command::Tick];
        commands.extend(self.refresh());
        commands
    }

    /// Apply one message.
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Tick(now) => {
                self.now = now;
                vec![Command::Tick]
            }
            Message::SpinnerFrame => {
                if self.ready {
                    self.spinner_armed = false;
                    Vec::new()
                } else {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                    vec![Command::Spinner]
                }
            }
            Message::ScanCompleted(entries) => {
                self.replace_entries(entries);
                Vec::new()
            }
            Message::CountCompleted(count) => {
                self.status = count.to_string();
                self.ready = true;
                Vec::new()
            }
            Message::Exported(outcome) => {
                self.status = match outcome {
                    Ok(path) => format!("export to {} successfully", path),
                    Err(e) => e.to_string(),
                };
                self.ready = true;
                Vec::new()
            }
            Message::Failed(reason) => {
                tracing::warn!(%reason, "background operation failed");
                self.status = reason;
                Vec::new()
            }
            Message::Resize { width, height } => {
                self.layout = PaneLayout::compute(width, height);
                self.clamp_detail_scroll();
                Vec::new()
            }
            Message::Key(key) => self.handle_key(key),
            Message::Mouse(mouse) => self.handle_mouse(mouse),
        }
    }

    /// Apply a user action in the current mode.
    pub fn apply(&mut self, action: Action) -> Vec<Command> {
        if action == Action::Quit {
            self.should_quit = true;
            return vec![Command::Quit];
        }
        match self.mode {
            Mode::Browse => self.browse(action),
            Mode::Search => self.search(action),
            Mode::Export => self.export(action),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selectors
    // ─────────────────────────────────────────────────────────────────────

    pub fn selected_entry(&self) -> Option<&KeyEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }

    pub fn scan_request(&self) -> ScanRequest {
        ScanRequest {
            offset: self.offset,
            pattern: self.pattern.clone(),
            limit: self.limit,
        }
    }

    pub fn is_prompting(&self) -> bool {
        self.mode != Mode::Browse
    }

    /// Text of the detail pane
    pub fn detail_content(&self) -> &str {
        match self.selected_entry() {
            Some(entry) => &entry.value_text,
            None if self.ready => "No keys found",
            None => "",
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if !events::is_press(&key) {
            return Vec::new();
        }
        let action = match self.mode {
            Mode::Browse => events::browse_action(key),
            Mode::Search | Mode::Export => events::prompt_action(key),
        };
        self.apply(action)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Command> {
        if self.mode != Mode::Browse {
            return Vec::new();
        }
        self.apply(events::mouse_action(mouse))
    }

    fn browse(&mut self, action: Action) -> Vec<Command> {
        let page = self.layout.list_page_size() as isize;
        let rows = i32::from(self.layout.detail_rows());

        match action {
            Action::Reload => {
                self.offset = 0;
                return self.refresh();
            }
            Action::NextScanPage => {
                self.offset += 1;
                return self.refresh();
            }
            Action::PrevScanPage if self.offset > 0 => {
                self.offset -= 1;
                return self.refresh();
            }
            Action::Search => {
                self.mode = Mode::Search;
                self.input.reset();
                self.placeholder = SEARCH_PLACEHOLDER.to_string();
            }
            Action::Export => match self.selected_entry() {
                Some(entry) => {
                    let file_name = format!("{}.json", entry.key);
                    self.input = Input::new(file_name.clone());
                    self.placeholder = file_name;
                    self.mode = Mode::Export;
                }
                None => self.status = NO_SELECTION.to_string(),
            },
            Action::SelectPrev => self.move_selection(-1),
            Action::SelectNext => self.move_selection(1),
            Action::ListPagePrev => self.move_selection(-page),
            Action::ListPageNext => self.move_selection(page),
            Action::DetailPageUp => self.scroll_detail(-rows),
            Action::DetailPageDown => self.scroll_detail(rows),
            Action::DetailScroll(delta) => self.scroll_detail(delta),
            _ => {}
        }
        Vec::new()
    }

    fn search(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Cancel => self.close_prompt(),
            Action::Commit => {
                self.pattern = self.input.value().to_string();
                self.offset = 0;
                self.close_prompt();
                tracing::debug!(pattern = %self.pattern, "search");
                return self.refresh();
            }
            Action::Edit(request) => {
                self.input.handle(request);
            }
            _ => {}
        }
        Vec::new()
    }

    fn export(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Cancel => self.close_prompt(),
            Action::Commit => {
                let Some(entry) = self.selected_entry() else {
                    self.status = NO_SELECTION.to_string();
                    return Vec::new();
                };
                let contents = entry.value_text.clone();
                let path = PathBuf::from(self.input.value());
                self.close_prompt();

                let mut commands = self.clear_readiness();
                commands.push(Command::Export { path, contents });
                return commands;
            }
            Action::Edit(request) => {
                self.input.handle(request);
            }
            _ => {}
        }
        Vec::new()
    }

    fn close_prompt(&mut self) {
        self.mode = Mode::Browse;
        self.input.reset();
        self.placeholder.clear();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Clear readiness and issue a scan/count pair for the current page.
    fn refresh(&mut self) -> Vec<Command> {
        let mut commands = self.clear_readiness();
        commands.push(Command::Scan(self.scan_request()));
        commands.push(Command::Count {
            pattern: self.pattern.clone(),
        });
        commands
    }

    /// Mark work outstanding; restarts the spinner if it had stopped.
    fn clear_readiness(&mut self) -> Vec<Command> {
        self.ready = false;
        if self.spinner_armed {
            Vec::new()
        } else {
            self.spinner_armed = true;
            vec![Command::Spinner]
        }
    }

    fn replace_entries(&mut self, entries: Vec<KeyEntry>) {
        self.selected = if entries.is_empty() { None } else { Some(0) };
        self.entries = entries;
        self.detail_scroll = 0;
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(current) = self.selected else {
            return;
        };
        let last = self.entries.len().saturating_sub(1) as isize;
        let next = (current as isize + delta).clamp(0, last) as usize;
        if next != current {
            self.selected = Some(next);
            self.detail_scroll = 0;
        }
    }

    fn scroll_detail(&mut self, delta: i32) {
        let target = i32::from(self.detail_scroll) + delta;
        self.detail_scroll = u16::try_from(target.max(0)).unwrap_or(u16::MAX);
        self.clamp_detail_scroll();
    }

    fn clamp_detail_scroll(&mut self) {
        let lines = u16::try_from(self.detail_content().lines().count()).unwrap_or(u16::MAX);
        let max = lines.saturating_sub(self.layout.detail_rows());
        self.detail_scroll = self.detail_scroll.min(max);
    }
}
