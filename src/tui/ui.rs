//! Rendering
//!
//! Pure functions from [`Session`] to ratatui widgets.
//!
//! ```text
//! ┌ Redis Viewer ──┐┌ key (type) ─────────────────────┐
//! │ key            ││ {                               │
//! │   description  ││   "value": ...                  │
//! └────────────────┘└─────────────────────────────────┘
//!  ⣾ status │ pattern │ page                    clock
//! ```

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::state::{Mode, Session, STATUS_BAR_HEIGHT};
use super::theme::Theme;
use super::widgets::utils::{truncate, window};
use super::widgets::Spinner;
use crate::engine::humanize_bytes;

const LIST_TITLE: &str = " Redis Viewer ";
const PROMPT: &str = "> ";
const READY_DOT: &str = "●";

pub fn render(frame: &mut Frame, session: &Session, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(session.layout.list_width),
            Constraint::Min(0),
        ])
        .split(rows[0]);

    render_list(frame, session, theme, panes[0]);
    render_detail(frame, session, theme, panes[1]);
    render_status_bar(frame, session, theme, rows[1]);
}

fn render_list(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    // Room for the highlight symbol and borders
    let text_width = usize::from(area.width.saturating_sub(4));

    let items: Vec<ListItem> = session
        .entries
        .iter()
        .map(|entry| {
            ListItem::new(vec![
                Line::from(Span::styled(truncate(&entry.key, text_width), theme.text())),
                Line::from(Span::styled(
                    truncate(&entry.description(), text_width),
                    theme.description(entry.is_error),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border(!session.is_prompting()))
                .title(Span::styled(LIST_TITLE, theme.title())),
        )
        .highlight_style(theme.selected())
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(session.selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let title = match session.selected_entry() {
        Some(entry) if entry.is_error => format!(" {} ", entry.key),
        Some(entry) => format!(
            " {} ({}, {}) ",
            entry.key,
            entry.key_type,
            humanize_bytes(entry.value_text.len() as u64)
        ),
        None => String::new(),
    };
    let style = match session.selected_entry() {
        Some(entry) if entry.is_error => theme.error(),
        _ => theme.text(),
    };

    let detail = Paragraph::new(session.detail_content())
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border(false))
                .title(Span::styled(title, theme.accent())),
        )
        .scroll((session.detail_scroll, 0));
    frame.render_widget(detail, area);
}

fn render_status_bar(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    frame.render_widget(Block::default().style(theme.status_bar()), area);
    if area.width < 3 {
        return;
    }

    // Readiness indicator
    let indicator = Rect::new(area.x + 1, area.y, 1, 1);
    if session.ready {
        frame.render_widget(
            Paragraph::new(READY_DOT).style(theme.indicator(true)),
            indicator,
        );
    } else {
        frame.render_widget(
            Spinner::new(session.spinner_frame).style(theme.indicator(false)),
            indicator,
        );
    }

    let clock_width = session.now.chars().count() as u16 + 1;
    let body = Rect::new(
        area.x + 3,
        area.y,
        area.width.saturating_sub(3 + clock_width),
        1,
    );

    match session.mode {
        Mode::Browse => {
            let pattern = if session.pattern.is_empty() {
                "*"
            } else {
                session.pattern.as_str()
            };
            let line = Line::from(vec![
                Span::styled(session.status.clone(), theme.status_bar()),
                Span::styled("  │  ", theme.dimmed()),
                Span::styled(format!("match {}", pattern), theme.status_bar()),
                Span::styled("  │  ", theme.dimmed()),
                Span::styled(format!("page {}", session.offset + 1), theme.status_bar()),
            ]);
            frame.render_widget(Paragraph::new(line), body);
        }
        Mode::Search | Mode::Export => render_prompt(frame, session, theme, body),
    }

    let clock_area = Rect::new(
        area.right().saturating_sub(clock_width).max(area.x),
        area.y,
        clock_width.saturating_sub(1).min(area.width),
        1,
    );
    let clock = Paragraph::new(session.now.as_str())
        .style(theme.status_bar())
        .alignment(Alignment::Right);
    frame.render_widget(clock, clock_area);
}

fn render_prompt(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let prompt_width = PROMPT.len() as u16;
    let field = usize::from(area.width.saturating_sub(prompt_width + 1));
    let scroll = session.input.visual_scroll(field);

    let text = if session.input.value().is_empty() {
        Span::styled(session.placeholder.clone(), theme.dimmed())
    } else {
        Span::styled(window(session.input.value(), scroll, field), theme.text())
    };
    let line = Line::from(vec![Span::styled(PROMPT, theme.accent()), text]);
    frame.render_widget(Paragraph::new(line), area);

    let cursor = session.input.visual_cursor().saturating_sub(scroll) as u16;
    frame.set_cursor_position(Position::new(area.x + prompt_width + cursor, area.y));
}
