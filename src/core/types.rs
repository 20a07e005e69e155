//! Canonical type definitions for the core domain
//!
//! This module contains the single source of truth for types shared across
//! the API client, the conversation state machine, and the TUI, to prevent
//! type drift. Other modules should `pub use` these types rather than
//! defining their own.

use serde::{Deserialize, Serialize};

/// Search mode determines which index the backend queries
///
/// The wire id of each mode is used verbatim as a URL path segment and as
/// the key of the persisted history map (`"{id}_chat"`). Display metadata
/// (names, descriptions, icons) lives in the presentation layer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Full-text search against all uploaded documents
    Fulltext,
    /// Approximate nearest-neighbor similarity search
    Vector,
    /// Conversational search against the corpus
    Chat,
}

impl SearchMode {
    /// All modes, in registry order
    pub const ALL: [SearchMode; 3] = [Self::Fulltext, Self::Vector, Self::Chat];

    /// Stable wire id, used as a URL path segment
    pub fn id(&self) -> &'static str {
        match self {
            Self::Fulltext => "list",
            Self::Vector => "vector",
            Self::Chat => "chat",
        }
    }

    /// Key under which the backend stores this mode's history
    pub fn history_key(&self) -> String {
        format!("{}_chat", self.id())
    }

    /// Get the next mode in the registry cycle
    pub fn next(self) -> Self {
        match self {
            Self::Fulltext => Self::Vector,
            Self::Vector => Self::Chat,
            Self::Chat => Self::Fulltext,
        }
    }

    /// Get the previous mode in the registry cycle
    pub fn prev(self) -> Self {
        match self {
            Self::Fulltext => Self::Chat,
            Self::Vector => Self::Fulltext,
            Self::Chat => Self::Vector,
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" | "fulltext" => Ok(Self::Fulltext),
            "vector" => Ok(Self::Vector),
            "chat" => Ok(Self::Chat),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when parsing an unrecognized mode id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModeError(pub String);

impl std::fmt::Display for UnknownModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown search mode: {}", self.0)
    }
}

impl std::error::Error for UnknownModeError {}

/// One prompt/completion round trip, wire-compatible with the backend
///
/// Histories are append-only and chronological; entries are never reordered
/// or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub prompt: String,
    pub completion: String,
}

impl HistoryEntry {
    pub fn new(prompt: impl Into<String>, completion: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            completion: completion.into(),
        }
    }
}
