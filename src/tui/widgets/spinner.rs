//! Spinner Widget
//!
//! Shown in the status bar while a scan/count pair is outstanding.

use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

/// Spinner animation frames
pub const DOT_SPINNER: &[char] = &['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

pub struct Spinner {
    /// Advanced once per spinner message
    frame: usize,
    chars: &'static [char],
    style: Style,
}

impl Spinner {
    pub fn new(frame: usize) -> Self {
        Self {
            frame,
            chars: DOT_SPINNER,
            style: Style::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn current_char(&self) -> char {
        self.chars[self.frame % self.chars.len()]
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_string(area.x, area.y, self.current_char().to_string(), self.style);
    }
}
