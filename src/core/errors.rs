//! Domain error types
//!
//! These errors represent business logic failures, distinct from transport
//! errors (`api::ApiError`). Using thiserror for ergonomic error handling
//! with proper Display implementations.

use crate::api::ApiError;
use thiserror::Error;

/// Errors related to session identity
#[derive(Debug, Error)]
pub enum SessionError {
    /// An explicit session identifier was supplied but empty
    #[error("session identifier must be a non-empty string")]
    EmptyIdentifier,

    /// The backend base URL could not be parsed
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Errors related to the corpus view
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A local file to upload could not be read
    #[error("cannot read {path}: {source}")]
    UnreadableFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A file path had no usable filename component
    #[error("no filename in path: {0}")]
    NoFilename(String),

    /// Backend request failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors related to the conversation state machine
#[derive(Debug, Error)]
pub enum ConversationError {
    /// A prompt was submitted while no mode was active
    #[error("no search mode selected")]
    NoModeSelected,

    /// A prompt was submitted while the active mode was still initializing
    #[error("the active mode is still initializing")]
    ModeInitializing,

    /// A prompt was submitted while another is in flight
    #[error("a prompt is already waiting for a completion")]
    PromptInFlight,

    /// A blank prompt was submitted
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// Backend request failed
    #[error(transparent)]
    Api(#[from] ApiError),
}
