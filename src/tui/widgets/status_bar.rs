//! Status bar: session identity, active mode, and transient notices

use crate::core::session::SessionId;
use crate::core::types::SearchMode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::mode_bar::mode_label;

/// One-line summary at the top of the screen
pub struct StatusBar<'a> {
    session: &'a SessionId,
    mode: Option<SearchMode>,
    file_count: usize,
    /// Transient notice (usually a reported error)
    notice: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        session: &'a SessionId,
        mode: Option<SearchMode>,
        file_count: usize,
        notice: Option<&'a str>,
    ) -> Self {
        Self {
            session,
            mode,
            file_count,
            notice,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            Span::styled(
                " docsearch ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" session "),
            Span::styled(self.session.to_string(), Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " │ {} file{}",
                self.file_count,
                if self.file_count == 1 { "" } else { "s" }
            )),
        ];

        match self.mode {
            Some(mode) => {
                spans.push(Span::raw(" │ mode: "));
                spans.push(Span::styled(
                    mode_label(mode),
                    Style::default().fg(Color::Cyan),
                ));
            }
            None => spans.push(Span::styled(
                " │ no mode selected",
                Style::default().fg(Color::DarkGray),
            )),
        }

        if let Some(notice) = self.notice {
            spans.push(Span::styled(
                format!(" │ {}", notice),
                Style::default().fg(Color::Red),
            ));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
