//! Search mode selector bar
//!
//! Presentation metadata for the modes lives here, outside the core: the
//! core enum carries only data fields.

use crate::core::types::SearchMode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Display name for a mode
pub fn mode_label(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Fulltext => "Full Text",
        SearchMode::Vector => "Vector",
        SearchMode::Chat => "Chat",
    }
}

/// One-line description for a mode
pub fn mode_description(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Fulltext => "Search against all the documents uploaded",
        SearchMode::Vector => "Find similar data using approximate nearest neighbors",
        SearchMode::Chat => "Converse with a bot against your documents",
    }
}

/// Glyph shown next to a mode's name
pub fn mode_icon(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Fulltext => "≡",
        SearchMode::Vector => "◇",
        SearchMode::Chat => "◉",
    }
}

/// Function key that selects a mode
pub fn mode_hotkey(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Fulltext => "F1",
        SearchMode::Vector => "F2",
        SearchMode::Chat => "F3",
    }
}

/// Renders the three modes side by side, highlighting the active one
pub struct ModeBar {
    active: Option<SearchMode>,
}

impl ModeBar {
    pub fn new(active: Option<SearchMode>) -> Self {
        Self { active }
    }
}

impl Widget for ModeBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for (mode, cell) in SearchMode::ALL.into_iter().zip(cells.iter()) {
            let is_active = self.active == Some(mode);
            let (border_style, title_style) = if is_active {
                (
                    Style::default().fg(Color::Cyan),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (
                    Style::default(),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            };

            let title = Line::from(vec![
                Span::styled(format!(" {} ", mode_icon(mode)), title_style),
                Span::styled(mode_label(mode), title_style),
                Span::styled(
                    format!("  {} ", mode_hotkey(mode)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            let body = Line::from(Span::styled(
                mode_description(mode),
                Style::default().fg(Color::DarkGray),
            ));

            Paragraph::new(body)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border_style)
                        .title(title),
                )
                .render(*cell, buf);
        }
    }
}
