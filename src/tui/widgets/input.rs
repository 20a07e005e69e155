//! Multiline prompt input with cursor management
//!
//! Plain Enter inserts a newline; submission is the caller's concern
//! (Ctrl+Enter at the app level). The buffer is cleared optimistically at
//! submission time, independent of response latency.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Prompt input state
#[derive(Debug, Clone)]
pub struct InputWidget {
    /// Current input content
    content: String,
    /// Cursor position (byte offset)
    cursor: usize,
    /// Whether submission is currently allowed
    enabled: bool,
    /// Placeholder text
    placeholder: String,
}

impl Default for InputWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl InputWidget {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            enabled: false,
            placeholder: "Send a message...".to_string(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Insert a character at the cursor position
    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert a string at the cursor position
    pub fn insert_str(&mut self, s: &str) {
        self.content.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Insert a line break at the cursor position
    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the character before the cursor (backspace)
    pub fn delete_char_before(&mut self) {
        if self.cursor > 0 {
            let prev_boundary = self.content[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.content.remove(prev_boundary);
            self.cursor = prev_boundary;
        }
    }

    /// Delete the character at the cursor (delete key)
    pub fn delete_char_at(&mut self) {
        if self.cursor < self.content.len() {
            self.content.remove(self.cursor);
        }
    }

    /// Move the cursor one character left
    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.content[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    /// Move the cursor one character right
    pub fn move_right(&mut self) {
        if let Some(c) = self.content[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Take the buffer contents, clearing the input
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    /// (line, column) of the cursor for terminal cursor placement
    pub fn cursor_position(&self) -> (u16, u16) {
        let before = &self.content[..self.cursor];
        let line = before.matches('\n').count() as u16;
        let column = before.rsplit('\n').next().unwrap_or("").width() as u16;
        (line, column)
    }
}

impl Widget for &InputWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Prompt ");

        let lines: Vec<Line> = if self.content.is_empty() {
            vec![Line::from(Span::styled(
                self.placeholder.clone(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))]
        } else {
            self.content.split('\n').map(Line::from).collect()
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_take() {
        let mut input = InputWidget::new();
        input.insert_str("define X");
        assert_eq!(input.content(), "define X");

        let taken = input.take();
        assert_eq!(taken, "define X");
        assert!(input.is_empty());
        assert_eq!(input.cursor_position(), (0, 0));
    }

    #[test]
    fn test_multiline_editing() {
        let mut input = InputWidget::new();
        input.insert_str("first");
        input.insert_newline();
        input.insert_str("second");
        assert_eq!(input.content(), "first\nsecond");
        assert_eq!(input.cursor_position(), (1, 6));
    }

    #[test]
    fn test_backspace_respects_char_boundaries() {
        let mut input = InputWidget::new();
        input.insert_str("héllo");
        input.delete_char_before();
        input.delete_char_before();
        input.delete_char_before();
        assert_eq!(input.content(), "hé");
        input.delete_char_before();
        assert_eq!(input.content(), "h");
    }

    #[test]
    fn test_cursor_movement_and_mid_insert() {
        let mut input = InputWidget::new();
        input.insert_str("ac");
        input.move_left();
        input.insert_char('b');
        assert_eq!(input.content(), "abc");

        input.move_right();
        input.insert_char('d');
        assert_eq!(input.content(), "abcd");
    }

    #[test]
    fn test_delete_at_cursor() {
        let mut input = InputWidget::new();
        input.insert_str("abc");
        input.move_left();
        input.move_left();
        input.delete_char_at();
        assert_eq!(input.content(), "ac");
    }
}
