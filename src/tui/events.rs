//! Event handling for the TUI
//!
//! Handles keyboard and terminal events using crossterm.

use std::time::Duration;

use crossterm::event::{self, KeyCode, KeyEvent, KeyModifiers};

/// Events that can occur in the TUI
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed
    Key(KeyEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Paste event (bracketed paste)
    Paste(String),
    /// Tick event for periodic updates
    Tick,
}

/// Handles events from the terminal
#[derive(Debug)]
pub struct EventHandler {
    /// Tick rate for periodic updates
    tick_rate: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    /// Create a new event handler with default tick rate (250ms)
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Create a new event handler with custom tick rate
    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Poll for the next event
    ///
    /// Returns `Some(Event)` if an event occurred, or a `Tick` if the tick
    /// rate elapsed.
    pub fn poll(&self) -> anyhow::Result<Event> {
        if event::poll(self.tick_rate)? {
            Ok(Self::convert_event(event::read()?))
        } else {
            Ok(Event::Tick)
        }
    }

    /// Convert a crossterm event to our Event type
    fn convert_event(event: event::Event) -> Event {
        match event {
            event::Event::Key(key) => Event::Key(key),
            event::Event::Resize(cols, rows) => Event::Resize(cols, rows),
            event::Event::Paste(text) => Event::Paste(text),
            // Mouse, FocusGained, FocusLost are treated as ticks
            _ => Event::Tick,
        }
    }
}

/// Helper functions for key event matching
impl Event {
    /// Check if this is a quit key (Ctrl-C or Ctrl-Q)
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }) | Event::Key(KeyEvent {
                code: KeyCode::Char('q'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }

    /// Check if this is the prompt submission combination (Ctrl-Enter)
    pub fn is_submit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn make_key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_is_quit_ctrl_c() {
        let event = make_key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(event.is_quit());
    }

    #[test]
    fn test_is_quit_ctrl_q() {
        let event = make_key_event(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(event.is_quit());
    }

    #[test]
    fn test_plain_q_is_typable() {
        let event = make_key_event(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!event.is_quit());
    }

    #[test]
    fn test_ctrl_enter_submits() {
        let event = make_key_event(KeyCode::Enter, KeyModifiers::CONTROL);
        assert!(event.is_submit());
    }

    #[test]
    fn test_plain_enter_does_not_submit() {
        let event = make_key_event(KeyCode::Enter, KeyModifiers::NONE);
        assert!(!event.is_submit());
    }

    #[test]
    fn test_event_handler_custom_tick_rate() {
        let handler = EventHandler::with_tick_rate(Duration::from_millis(100));
        assert_eq!(handler.tick_rate, Duration::from_millis(100));
    }
}
