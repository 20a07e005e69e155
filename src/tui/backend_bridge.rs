//! Backend bridge for TUI integration
//!
//! Connects the TUI event loop to the search backend: network calls run on
//! spawned tasks and their completions come back over an unbounded channel,
//! applied between frames.
//!
//! The bridge upholds the ordering half of the race fix: all effects of one
//! mode transition run sequentially inside a single task, so the save of
//! the previous mode's history completes before the load of the new mode's
//! begins. The generation stamps carried by the events cover the rest.

use crate::api::{ApiError, SearchBackend};
use crate::core::session::SessionId;
use crate::core::types::{HistoryEntry, SearchMode};
use crate::core::Effect;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Completions sent from the backend tasks to the TUI
#[derive(Debug)]
pub enum BackendEvent {
    /// Wholesale corpus list arrived
    CorpusLoaded(Result<Vec<String>, ApiError>),
    /// A delete round trip finished; `Ok(None)` means the backend did not
    /// echo a filename back
    FileDeleted(Result<Option<String>, ApiError>),
    /// A history load finished; feed into the state machine with its stamp
    HistoryLoaded {
        generation: u64,
        result: Result<Vec<HistoryEntry>, ApiError>,
    },
    /// A prompt round trip finished
    PromptCompleted {
        generation: u64,
        result: Result<HistoryEntry, ApiError>,
    },
    /// A history save finished
    HistorySaved {
        mode: SearchMode,
        result: Result<(), ApiError>,
    },
}

/// Executes effects against the backend on behalf of the TUI
pub struct BackendBridge {
    backend: Arc<dyn SearchBackend>,
    session: SessionId,
    tx: mpsc::UnboundedSender<BackendEvent>,
}

impl BackendBridge {
    /// Create a bridge and the receiving end of its event channel
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        session: SessionId,
    ) -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                backend,
                session,
                tx,
            },
            rx,
        )
    }

    /// Fetch the session's corpus list
    pub fn refresh_corpus(&self) {
        let backend = Arc::clone(&self.backend);
        let session = self.session.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.list_files(&session).await;
            let _ = tx.send(BackendEvent::CorpusLoaded(result));
        });
    }

    /// Delete one file from the session's corpus
    pub fn delete_file(&self, filename: String) {
        let backend = Arc::clone(&self.backend);
        let session = self.session.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.delete_file(&session, &filename).await;
            let _ = tx.send(BackendEvent::FileDeleted(result));
        });
    }

    /// Execute the effects of one transition, in order, in one task
    ///
    /// A `SaveHistory` emitted before a `LoadHistory` is therefore awaited
    /// before that load starts.
    pub fn run(&self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        let backend = Arc::clone(&self.backend);
        let session = self.session.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            for effect in effects {
                let event = Self::execute(&*backend, &session, effect).await;
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
    }

    /// Execute one flush synchronously; used during shutdown, when the
    /// event loop is gone and there is nobody left to notify
    pub async fn flush(&self, effect: Effect) -> Result<(), ApiError> {
        match effect {
            Effect::SaveHistory { mode, entries } => {
                self.backend
                    .save_history(&self.session, mode, &entries)
                    .await
            }
            other => {
                tracing::warn!("flush called with non-save effect: {:?}", other);
                Ok(())
            }
        }
    }

    async fn execute(
        backend: &dyn SearchBackend,
        session: &SessionId,
        effect: Effect,
    ) -> BackendEvent {
        match effect {
            Effect::SaveHistory { mode, entries } => {
                let result = backend.save_history(session, mode, &entries).await;
                BackendEvent::HistorySaved { mode, result }
            }
            Effect::LoadHistory { mode, generation } => {
                let result = backend.load_history(session, mode).await;
                BackendEvent::HistoryLoaded { generation, result }
            }
            Effect::SubmitPrompt {
                mode,
                prompt,
                generation,
            } => {
                let result = backend.submit_prompt(session, mode, &prompt).await;
                BackendEvent::PromptCompleted { generation, result }
            }
        }
    }
}
