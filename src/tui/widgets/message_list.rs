//! Conversation history display
//!
//! Renders the active mode's prompt/completion exchanges with word
//! wrapping and a scroll state that sticks to the bottom, so the newest
//! entry is always visible when the history changes.

use crate::core::types::HistoryEntry;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, StatefulWidget, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Scroll state for the history viewport
#[derive(Debug)]
pub struct MessageListState {
    /// First visible display line
    offset: usize,
    /// Whether the viewport follows the newest entry
    stick_to_bottom: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self {
            offset: 0,
            stick_to_bottom: true,
        }
    }
}

impl MessageListState {
    /// Scroll up, detaching from the bottom
    pub fn scroll_up(&mut self, lines: usize) {
        self.stick_to_bottom = false;
        self.offset = self.offset.saturating_sub(lines);
    }

    /// Scroll down; reattaches when the bottom is reached
    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines);
    }

    /// Jump to the newest entry and follow it again
    pub fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
    }
}

/// Renders the history of the active mode
pub struct MessageList<'a> {
    entries: &'a [HistoryEntry],
    /// A prompt is in flight
    waiting: bool,
    /// The mode's history is still loading
    initializing: bool,
}

impl<'a> MessageList<'a> {
    pub fn new(entries: &'a [HistoryEntry], waiting: bool, initializing: bool) -> Self {
        Self {
            entries,
            waiting,
            initializing,
        }
    }

    fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        let prompt_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let completion_style = Style::default();

        let mut lines = Vec::new();
        for entry in self.entries {
            for (i, text) in wrap_text(entry.prompt.trim(), width.saturating_sub(6)).iter().enumerate() {
                let marker = if i == 0 { "you ▸ " } else { "      " };
                lines.push(Line::from(vec![
                    Span::styled(marker.to_string(), prompt_style),
                    Span::styled(text.clone(), prompt_style),
                ]));
            }
            for (i, text) in wrap_text(entry.completion.trim(), width.saturating_sub(6))
                .iter()
                .enumerate()
            {
                let marker = if i == 0 { "bot ▸ " } else { "      " };
                lines.push(Line::from(vec![
                    Span::styled(marker.to_string(), Style::default().fg(Color::Green)),
                    Span::styled(text.clone(), completion_style),
                ]));
            }
            lines.push(Line::default());
        }

        if self.waiting {
            lines.push(Line::from(Span::styled(
                "▪ waiting for completion...",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }
}

impl StatefulWidget for MessageList<'_> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = Block::default().borders(Borders::ALL).title(" Conversation ");
        let inner = block.inner(area);
        block.render(area, buf);

        if self.initializing {
            Paragraph::new(Line::from(Span::styled(
                "Initializing mode...",
                Style::default().fg(Color::DarkGray),
            )))
            .render(inner, buf);
            return;
        }

        let lines = self.build_lines(inner.width as usize);
        let height = inner.height as usize;
        let max_offset = lines.len().saturating_sub(height);

        if state.stick_to_bottom {
            state.offset = max_offset;
        } else {
            state.offset = state.offset.min(max_offset);
            if state.offset == max_offset {
                state.stick_to_bottom = true;
            }
        }

        let visible: Vec<Line> = lines
            .into_iter()
            .skip(state.offset)
            .take(height)
            .collect();
        Paragraph::new(visible).render(inner, buf);
    }
}

/// Word-wrap `text` to `width` display columns, preserving blank lines
///
/// Words wider than the viewport are hard-broken.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in raw.split_whitespace() {
            let word_width = word.width();
            if current_width > 0 && current_width + 1 + word_width <= width {
                current.push(' ');
                current.push_str(word);
                current_width += 1 + word_width;
                continue;
            }
            if current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if word_width <= width {
                current.push_str(word);
                current_width = word_width;
            } else {
                for c in word.chars() {
                    let char_width = c.width().unwrap_or(0);
                    if current_width + char_width > width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0;
                    }
                    current.push(c);
                    current_width += char_width;
                }
            }
        }
        lines.push(current);
    }
    lines
}
