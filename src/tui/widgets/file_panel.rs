//! Corpus panel: the session's uploaded files
//!
//! Shows a loading indicator instead of the list while a refresh is in
//! flight. Selection wraps; deletion of the selected file is handled at
//! the app level.

use crate::core::CorpusView;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

/// Selection state for the corpus list
#[derive(Debug, Default)]
pub struct FilePanelState {
    selected: Option<usize>,
}

impl FilePanelState {
    /// Currently selected filename, if any
    pub fn selected<'a>(&self, corpus: &'a CorpusView) -> Option<&'a str> {
        self.selected
            .and_then(|i| corpus.files().get(i))
            .map(String::as_str)
    }

    /// Move the selection down, wrapping
    pub fn select_next(&mut self, corpus: &CorpusView) {
        if corpus.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < corpus.len() => i + 1,
            _ => 0,
        });
    }

    /// Move the selection up, wrapping
    pub fn select_prev(&mut self, corpus: &CorpusView) {
        if corpus.is_empty() {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => corpus.len() - 1,
            Some(i) => i - 1,
        });
    }

    /// Clamp the selection after the corpus changed underneath it
    pub fn reconcile(&mut self, corpus: &CorpusView) {
        match self.selected {
            Some(i) if i >= corpus.len() => {
                self.selected = corpus.len().checked_sub(1);
            }
            _ if corpus.is_empty() => self.selected = None,
            _ => {}
        }
    }
}

/// Renders the corpus file list
pub struct FilePanel<'a> {
    corpus: &'a CorpusView,
}

impl<'a> FilePanel<'a> {
    pub fn new(corpus: &'a CorpusView) -> Self {
        Self { corpus }
    }
}

impl StatefulWidget for FilePanel<'_> {
    type State = FilePanelState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let title = format!(" Corpus ({}) ", self.corpus.len());
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.corpus.is_loading() {
            Paragraph::new(Line::from(Span::styled(
                "Loading corpus...",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block)
            .render(area, buf);
            return;
        }

        if self.corpus.is_empty() {
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "No files yet.",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    "Upload with: docsearch files add <path>",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(block)
            .render(area, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .corpus
            .files()
            .iter()
            .map(|file| ListItem::new(format!("▪ {}", file)))
            .collect();

        let mut list_state = ListState::default();
        list_state.select(state.selected);

        StatefulWidget::render(
            List::new(items).block(block).highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            area,
            buf,
            &mut list_state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(files: &[&str]) -> CorpusView {
        let mut corpus = CorpusView::new();
        corpus.finish_refresh(files.iter().map(|s| s.to_string()).collect());
        corpus
    }

    #[test]
    fn test_selection_wraps() {
        let corpus = corpus(&["a.txt", "b.txt"]);
        let mut state = FilePanelState::default();

        state.select_next(&corpus);
        assert_eq!(state.selected(&corpus), Some("a.txt"));
        state.select_next(&corpus);
        assert_eq!(state.selected(&corpus), Some("b.txt"));
        state.select_next(&corpus);
        assert_eq!(state.selected(&corpus), Some("a.txt"));

        state.select_prev(&corpus);
        assert_eq!(state.selected(&corpus), Some("b.txt"));
    }

    #[test]
    fn test_selection_on_empty_corpus() {
        let corpus = CorpusView::new();
        let mut state = FilePanelState::default();
        state.select_next(&corpus);
        assert_eq!(state.selected(&corpus), None);
    }

    #[test]
    fn test_reconcile_after_delete() {
        let mut view = corpus(&["a.txt", "b.txt"]);
        let mut state = FilePanelState::default();
        state.select_prev(&view); // selects last: b.txt

        view.apply_deleted(Some("b.txt".to_string()));
        state.reconcile(&view);
        assert_eq!(state.selected(&view), Some("a.txt"));

        view.apply_deleted(Some("a.txt".to_string()));
        state.reconcile(&view);
        assert_eq!(state.selected(&view), None);
    }
}
