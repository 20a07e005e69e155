//! TUI application: state, event loop, and rendering
//!
//! The app owns the core state (corpus view, conversation state machine)
//! and drives it from two event sources: terminal input and backend
//! completions arriving over the bridge channel. All state transitions run
//! on this loop; spawned network tasks only ever report back through the
//! channel.

use crate::api::SearchBackend;
use crate::core::session::{SessionBootstrap, SessionId};
use crate::core::types::SearchMode;
use crate::core::{Conversation, CorpusView};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use super::backend_bridge::{BackendBridge, BackendEvent};
use super::events::{Event, EventHandler};
use super::widgets::{
    FilePanel, FilePanelState, InputWidget, MessageList, MessageListState, ModeBar, StatusBar,
};

/// Terminal chat application for one session
pub struct TuiApp {
    session: SessionId,
    resume_url: Url,
    corpus: CorpusView,
    conversation: Conversation,
    input: InputWidget,
    file_panel: FilePanelState,
    messages: MessageListState,
    /// Transient status-bar notice, usually a reported error
    notice: Option<String>,
    should_quit: bool,
    bridge: BackendBridge,
    rx: mpsc::UnboundedReceiver<BackendEvent>,
    events: EventHandler,
}

impl TuiApp {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        bootstrap: &SessionBootstrap,
        tick_rate: Duration,
    ) -> Self {
        let (bridge, rx) = BackendBridge::new(backend, bootstrap.id.clone());
        Self {
            session: bootstrap.id.clone(),
            resume_url: bootstrap.resume_url.clone(),
            corpus: CorpusView::new(),
            conversation: Conversation::new(),
            input: InputWidget::new(),
            file_panel: FilePanelState::default(),
            messages: MessageListState::default(),
            notice: None,
            should_quit: false,
            bridge,
            rx,
            events: EventHandler::with_tick_rate(tick_rate),
        }
    }

    /// Run the TUI until quit, flushing unsaved history on the way out
    pub async fn run(&mut self, initial_mode: Option<SearchMode>) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        crossterm::execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = self.event_loop(&mut terminal, initial_mode).await;

        disable_raw_mode()?;
        crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
        initial_mode: Option<SearchMode>,
    ) -> Result<()> {
        tracing::info!(session = %self.session, resume = %self.resume_url, "starting chat");

        self.corpus.begin_refresh();
        self.bridge.refresh_corpus();
        if let Some(mode) = initial_mode {
            self.select_mode(mode);
        }

        while !self.should_quit {
            while let Ok(event) = self.rx.try_recv() {
                self.apply_backend_event(event);
            }
            self.input.set_enabled(self.conversation.can_submit());
            terminal.draw(|frame| self.draw(frame))?;

            match self.events.poll()? {
                Event::Key(key) => self.on_key(key),
                Event::Paste(text) => {
                    if self.input.is_enabled() {
                        self.input.insert_str(&text);
                    }
                }
                Event::Resize(..) | Event::Tick => {}
            }
        }

        // Unmount: the active mode's unsaved turns must reach the backend.
        if let Some(effect) = self.conversation.flush_effect() {
            if let Err(e) = self.bridge.flush(effect).await {
                tracing::warn!("failed to persist history on exit: {}", e);
            }
        }
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        let event = Event::Key(key);
        if event.is_quit() {
            self.should_quit = true;
            return;
        }
        if event.is_submit() {
            self.submit_prompt();
            return;
        }

        match (key.code, key.modifiers) {
            (KeyCode::F(1), _) => self.select_mode(SearchMode::Fulltext),
            (KeyCode::F(2), _) => self.select_mode(SearchMode::Vector),
            (KeyCode::F(3), _) => self.select_mode(SearchMode::Chat),
            (KeyCode::Tab, _) => self.cycle_mode(false),
            (KeyCode::BackTab, _) => self.cycle_mode(true),

            (KeyCode::Char('r'), KeyModifiers::CONTROL) => self.refresh_corpus(),
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => self.delete_selected_file(),
            (KeyCode::Up, KeyModifiers::ALT) => self.file_panel.select_prev(&self.corpus),
            (KeyCode::Down, KeyModifiers::ALT) => self.file_panel.select_next(&self.corpus),

            (KeyCode::PageUp, _) => self.messages.scroll_up(5),
            (KeyCode::PageDown, _) => self.messages.scroll_down(5),
            (KeyCode::End, _) => self.messages.scroll_to_bottom(),

            _ => self.on_input_key(key),
        }
    }

    /// Editing keys reach the input only while submission is allowed,
    /// mirroring the disabled state of the original prompt field
    fn on_input_key(&mut self, key: KeyEvent) {
        if !self.input.is_enabled() {
            return;
        }
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input.insert_char(c);
            }
            KeyCode::Enter => self.input.insert_newline(),
            KeyCode::Backspace => self.input.delete_char_before(),
            KeyCode::Delete => self.input.delete_char_at(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            _ => {}
        }
    }

    /// Select a mode; a no-op when it is already active
    fn select_mode(&mut self, mode: SearchMode) {
        let effects = self.conversation.select_mode(mode);
        if effects.is_empty() {
            return;
        }
        self.messages.scroll_to_bottom();
        self.bridge.run(effects);
    }

    fn cycle_mode(&mut self, backwards: bool) {
        let next = match self.conversation.active_mode() {
            Some(mode) if backwards => mode.prev(),
            Some(mode) => mode.next(),
            None => SearchMode::ALL[0],
        };
        self.select_mode(next);
    }

    fn submit_prompt(&mut self) {
        match self.conversation.submit(self.input.content()) {
            Ok(effect) => {
                // Optimistic clear: the input empties at submission time,
                // not when the completion arrives.
                self.input.take();
                self.bridge.run(vec![effect]);
            }
            Err(e) => {
                tracing::debug!("prompt rejected: {}", e);
            }
        }
    }

    fn refresh_corpus(&mut self) {
        self.corpus.begin_refresh();
        self.bridge.refresh_corpus();
    }

    fn delete_selected_file(&mut self) {
        if let Some(filename) = self.file_panel.selected(&self.corpus) {
            self.bridge.delete_file(filename.to_string());
        }
    }

    fn apply_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::CorpusLoaded(Ok(files)) => {
                self.corpus.finish_refresh(files);
                self.file_panel.reconcile(&self.corpus);
            }
            BackendEvent::CorpusLoaded(Err(e)) => {
                self.corpus.refresh_failed();
                self.notice = Some(e.to_string());
            }
            BackendEvent::FileDeleted(Ok(deleted)) => {
                self.corpus.apply_deleted(deleted);
                self.file_panel.reconcile(&self.corpus);
            }
            BackendEvent::FileDeleted(Err(e)) => {
                self.notice = Some(e.to_string());
            }
            BackendEvent::HistoryLoaded { generation, result } => {
                let applied = match result {
                    Ok(entries) => self.conversation.load_finished(generation, entries),
                    Err(e) => self.conversation.load_failed(generation, e.to_string()),
                };
                if applied {
                    self.messages.scroll_to_bottom();
                }
            }
            BackendEvent::PromptCompleted { generation, result } => {
                let applied = match result {
                    Ok(entry) => self.conversation.prompt_finished(generation, entry),
                    Err(e) => self.conversation.prompt_failed(generation, e.to_string()),
                };
                if applied {
                    self.messages.scroll_to_bottom();
                }
            }
            BackendEvent::HistorySaved { mode, result } => {
                if let Err(e) = result {
                    tracing::warn!(mode = %mode, "history save failed: {}", e);
                    self.notice = Some(format!("save failed: {}", e));
                }
            }
        }

        if let Some(error) = self.conversation.take_error() {
            self.notice = Some(error);
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // status bar
                Constraint::Length(4), // mode bar
                Constraint::Min(5),    // corpus + conversation
                Constraint::Length(4), // input
                Constraint::Length(1), // key hints
            ])
            .split(frame.area());

        frame.render_widget(
            StatusBar::new(
                &self.session,
                self.conversation.active_mode(),
                self.corpus.len(),
                self.notice.as_deref(),
            ),
            rows[0],
        );

        frame.render_widget(ModeBar::new(self.conversation.active_mode()), rows[1]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(20)])
            .split(rows[2]);

        frame.render_stateful_widget(
            FilePanel::new(&self.corpus),
            columns[0],
            &mut self.file_panel,
        );
        frame.render_stateful_widget(
            MessageList::new(
                self.conversation.entries(),
                self.conversation.is_waiting(),
                self.conversation.is_initializing(),
            ),
            columns[1],
            &mut self.messages,
        );

        frame.render_widget(&self.input, rows[3]);

        let hints = Line::from(Span::styled(
            " Ctrl+Enter submit · F1-F3 mode · Tab cycle · Ctrl+R refresh · Alt+↑/↓ file · Ctrl+D delete · PgUp/PgDn scroll · Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(hints), rows[4]);
    }
}
