//! Theme - colors and styles for the viewer

use ratatui::style::{Color, Modifier, Style};

/// Viewer color palette
pub struct Theme {
    pub brick_red: Color,
    pub ember: Color,
    pub slate: Color,
    pub chalk: Color,
    pub ash: Color,

    pub ok_green: Color,
    pub error_red: Color,

    pub dim_red: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            brick_red: Color::Rgb(220, 56, 44), // #DC382C
            ember: Color::Rgb(255, 138, 76),    // #FF8A4C
            slate: Color::Rgb(36, 41, 47),      // #24292F
            chalk: Color::Rgb(230, 237, 243),   // #E6EDF3
            ash: Color::Rgb(128, 128, 128),

            ok_green: Color::Rgb(63, 185, 80), // #3FB950
            error_red: Color::Rgb(248, 81, 73), // #F85149

            dim_red: Color::Rgb(130, 38, 32),
        }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Text
    // ─────────────────────────────────────────────────────────────────────

    pub fn text(&self) -> Style {
        Style::default().fg(self.chalk)
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(self.ash)
    }

    /// Pane titles
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.brick_red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.ember)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error_red)
    }

    // ─────────────────────────────────────────────────────────────────────
    // List
    // ─────────────────────────────────────────────────────────────────────

    /// Selected list item
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.ember)
            .add_modifier(Modifier::BOLD)
    }

    /// Description line of an item; error entries are red
    pub fn description(&self, is_error: bool) -> Style {
        if is_error {
            self.error()
        } else {
            self.dimmed()
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chrome
    // ─────────────────────────────────────────────────────────────────────

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.brick_red)
        } else {
            Style::default().fg(self.dim_red)
        }
    }

    pub fn status_bar(&self) -> Style {
        Style::default().fg(self.chalk).bg(self.slate)
    }

    /// Readiness dot and spinner
    pub fn indicator(&self, ready: bool) -> Style {
        if ready {
            Style::default().fg(self.ok_green).bg(self.slate)
        } else {
            Style::default().fg(self.ember).bg(self.slate)
        }
    }
}
