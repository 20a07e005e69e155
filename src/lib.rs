//! docsearch: terminal client for a session-scoped document search backend
//!
//! This library provides:
//! - Session identity bootstrap carried in a shareable resume URL
//! - A corpus view synchronized with the backend's per-session file list
//! - A conversation state machine over interchangeable search modes
//!   (full-text, vector, chat), with per-mode history persistence
//! - A typed HTTP client for the backend's JSON API
//! - A terminal UI and one-shot CLI runners over the same core

pub mod api;
pub mod config;
pub mod core;
pub mod transport;
pub mod tui;

pub use api::{ApiError, HttpBackend, SearchBackend};
pub use config::Config;
pub use core::{Conversation, CorpusView, HistoryEntry, SearchMode};
