//! Terminal User Interface for docsearch
//!
//! A ratatui/crossterm front end over the core state machine: a mode bar,
//! the session's corpus, the active conversation, and a multiline prompt
//! input submitted with Ctrl+Enter.

pub mod app;
pub mod backend_bridge;
mod events;
pub mod widgets;

pub use app::TuiApp;
pub use backend_bridge::{BackendBridge, BackendEvent};
pub use events::{Event, EventHandler};
