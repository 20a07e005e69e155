//! Core domain logic, independent of transport and presentation
//!
//! Session identity, the corpus membership view, and the conversation
//! state machine. Everything here is sans-IO: network effects are emitted
//! as data and executed by the caller.

pub mod conversation;
pub mod corpus;
pub mod errors;
pub mod session;
pub mod types;

pub use conversation::{Conversation, Effect, Phase};
pub use corpus::CorpusView;
pub use errors::{ConversationError, CorpusError, SessionError};
pub use session::{SessionBootstrap, SessionId};
pub use types::{HistoryEntry, SearchMode};
