//! Conversation state machine - mode switching and history lifecycle
//!
//! Holds the ordered prompt/completion history for the active search mode,
//! loads prior history on mode entry, and persists history on mode exit.
//!
//! The machine is sans-IO: transitions emit [`Effect`]s describing the
//! network operations to perform, and completions are fed back in. Two
//! rules close the save/load race that a fire-and-forget design has:
//!
//! - the effects of one transition are ordered: the save of the previous
//!   mode's history comes before the load of the new mode's, and the driver
//!   must execute them in order within a single task;
//! - every load and prompt effect carries a generation stamp. A completion
//!   whose stamp no longer matches the machine's current generation targets
//!   a superseded mode and is discarded, so a slow response can never
//!   overwrite freshly loaded state.

use crate::core::errors::ConversationError;
use crate::core::types::{HistoryEntry, SearchMode};

/// Active selection state
///
/// Exactly one mode is ever `Initializing` or `Ready` at a time; there is
/// no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the first selection
    NoModeSelected,
    /// Mode entered; prior history is being fetched, submission suppressed
    Initializing(SearchMode),
    /// History displayed; prompts may be submitted
    Ready(SearchMode),
}

/// A network operation requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist `entries` under (session, `mode`); ordered before any load
    /// emitted by the same transition
    SaveHistory {
        mode: SearchMode,
        entries: Vec<HistoryEntry>,
    },
    /// Fetch prior history for `mode`; the completion must be fed back with
    /// the same `generation`
    LoadHistory { mode: SearchMode, generation: u64 },
    /// Submit `prompt` for `mode`; the completion must be fed back with the
    /// same `generation`
    SubmitPrompt {
        mode: SearchMode,
        prompt: String,
        generation: u64,
    },
}

/// Session-scoped conversation state for the active mode
#[derive(Debug)]
pub struct Conversation {
    phase: Phase,
    /// History of the active mode, append-only chronological
    entries: Vec<HistoryEntry>,
    /// Bumped on every mode switch; stamps loads and prompts
    generation: u64,
    /// Whether a prompt is in flight
    waiting: bool,
    /// Last reportable failure, surfaced once through [`take_error`]
    last_error: Option<String>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            phase: Phase::NoModeSelected,
            entries: Vec::new(),
            generation: 0,
            waiting: false,
            last_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The selected mode, whether initializing or ready
    pub fn active_mode(&self) -> Option<SearchMode> {
        match self.phase {
            Phase::NoModeSelected => None,
            Phase::Initializing(mode) | Phase::Ready(mode) => Some(mode),
        }
    }

    /// History entries of the active mode
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Whether a prompt is waiting for its completion
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Whether the active mode is still loading its history
    pub fn is_initializing(&self) -> bool {
        matches!(self.phase, Phase::Initializing(_))
    }

    /// Whether prompts may be submitted right now
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::Ready(_)) && !self.waiting
    }

    /// Take the last recorded failure, clearing it
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Select mode `mode`, returning the effects of the transition in
    /// execution order
    ///
    /// Selecting the already-active mode is a no-op and returns no effects.
    /// Otherwise: the previous mode's non-empty history is saved first, the
    /// displayed history is cleared immediately, and a generation-stamped
    /// load for the new mode is emitted.
    pub fn select_mode(&mut self, mode: SearchMode) -> Vec<Effect> {
        if self.active_mode() == Some(mode) {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if let Some(save) = self.flush_effect() {
            effects.push(save);
        }

        self.entries.clear();
        self.waiting = false;
        self.generation += 1;
        self.phase = Phase::Initializing(mode);
        tracing::debug!(mode = %mode, generation = self.generation, "entering mode");

        effects.push(Effect::LoadHistory {
            mode,
            generation: self.generation,
        });
        effects
    }

    /// Feed back a completed history load
    ///
    /// Returns `false` when the stamp is stale (a later switch superseded
    /// the load) and the state was left untouched.
    pub fn load_finished(&mut self, generation: u64, entries: Vec<HistoryEntry>) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "discarding stale load");
            return false;
        }
        let Phase::Initializing(mode) = self.phase else {
            return false;
        };
        self.entries = entries;
        self.phase = Phase::Ready(mode);
        true
    }

    /// Feed back a failed history load
    ///
    /// The mode still becomes ready, with an empty history and a recorded
    /// error, so the initializing indicator cannot hang forever.
    pub fn load_failed(&mut self, generation: u64, error: String) -> bool {
        if generation != self.generation {
            return false;
        }
        let Phase::Initializing(mode) = self.phase else {
            return false;
        };
        tracing::warn!(mode = %mode, "history load failed: {}", error);
        self.entries.clear();
        self.phase = Phase::Ready(mode);
        self.last_error = Some(error);
        true
    }

    /// Submit a prompt for the active mode
    ///
    /// Enters the waiting sub-state and returns the stamped effect to
    /// execute. Rejected while no mode is ready, while another prompt is in
    /// flight, or for a blank prompt.
    pub fn submit(&mut self, prompt: &str) -> Result<Effect, ConversationError> {
        let mode = match self.phase {
            Phase::NoModeSelected => return Err(ConversationError::NoModeSelected),
            Phase::Initializing(_) => return Err(ConversationError::ModeInitializing),
            Phase::Ready(mode) => mode,
        };
        if self.waiting {
            return Err(ConversationError::PromptInFlight);
        }
        if prompt.trim().is_empty() {
            return Err(ConversationError::EmptyPrompt);
        }

        self.waiting = true;
        Ok(Effect::SubmitPrompt {
            mode,
            prompt: prompt.to_string(),
            generation: self.generation,
        })
    }

    /// Feed back a completed prompt exchange; appends, never reorders
    pub fn prompt_finished(&mut self, generation: u64, entry: HistoryEntry) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale completion"
            );
            return false;
        }
        self.entries.push(entry);
        self.waiting = false;
        true
    }

    /// Feed back a failed prompt exchange
    pub fn prompt_failed(&mut self, generation: u64, error: String) -> bool {
        if generation != self.generation {
            return false;
        }
        self.waiting = false;
        self.last_error = Some(error);
        true
    }

    /// The save needed to not lose unsaved turns, if any
    ///
    /// Used on every mode exit and at shutdown.
    pub fn flush_effect(&self) -> Option<Effect> {
        let mode = self.active_mode()?;
        if self.entries.is_empty() {
            return None;
        }
        Some(Effect::SaveHistory {
            mode,
            entries: self.entries.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::new(format!("prompt {}", n), format!("completion {}", n))
    }

    fn ready_conversation(mode: SearchMode) -> Conversation {
        let mut convo = Conversation::new();
        let effects = convo.select_mode(mode);
        let Some(Effect::LoadHistory { generation, .. }) = effects.last() else {
            panic!("expected a load effect");
        };
        assert!(convo.load_finished(*generation, Vec::new()));
        convo
    }

    #[test]
    fn test_starts_with_no_mode() {
        let convo = Conversation::new();
        assert_eq!(convo.phase(), Phase::NoModeSelected);
        assert!(convo.entries().is_empty());
        assert!(!convo.can_submit());
    }

    #[test]
    fn test_first_selection_loads_without_saving() {
        let mut convo = Conversation::new();
        let effects = convo.select_mode(SearchMode::Fulltext);

        assert_eq!(effects.len(), 1, "nothing to save before the first mode");
        assert!(matches!(
            effects[0],
            Effect::LoadHistory {
                mode: SearchMode::Fulltext,
                ..
            }
        ));
        assert_eq!(convo.phase(), Phase::Initializing(SearchMode::Fulltext));
        assert!(!convo.can_submit());
    }

    #[test]
    fn test_selecting_active_mode_is_a_no_op() {
        let mut convo = ready_conversation(SearchMode::Fulltext);
        assert!(convo.select_mode(SearchMode::Fulltext).is_empty());
        assert_eq!(convo.phase(), Phase::Ready(SearchMode::Fulltext));

        // Also a no-op while still initializing.
        let mut convo = Conversation::new();
        convo.select_mode(SearchMode::Vector);
        assert!(convo.select_mode(SearchMode::Vector).is_empty());
    }

    #[test]
    fn test_switch_saves_previous_history_before_loading() {
        let mut convo = ready_conversation(SearchMode::Fulltext);
        let gen = match convo.submit("q").unwrap() {
            Effect::SubmitPrompt { generation, .. } => generation,
            other => panic!("unexpected effect {:?}", other),
        };
        convo.prompt_finished(gen, entry(1));

        let effects = convo.select_mode(SearchMode::Vector);
        assert_eq!(effects.len(), 2);
        assert_eq!(
            effects[0],
            Effect::SaveHistory {
                mode: SearchMode::Fulltext,
                entries: vec![entry(1)],
            },
            "save of the previous mode comes first"
        );
        assert!(matches!(
            effects[1],
            Effect::LoadHistory {
                mode: SearchMode::Vector,
                ..
            }
        ));
        // Displayed history is cleared immediately, before the load lands.
        assert!(convo.entries().is_empty());
    }

    #[test]
    fn test_switch_with_empty_history_skips_the_save() {
        let mut convo = ready_conversation(SearchMode::Fulltext);
        let effects = convo.select_mode(SearchMode::Chat);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::LoadHistory { .. }));
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut convo = Conversation::new();
        let first = convo.select_mode(SearchMode::Fulltext);
        let Effect::LoadHistory {
            generation: stale, ..
        } = first[0]
        else {
            panic!("expected load");
        };

        // A second, faster switch supersedes the first load.
        let second = convo.select_mode(SearchMode::Vector);
        let Effect::LoadHistory {
            generation: current,
            ..
        } = *second.last().unwrap()
        else {
            panic!("expected load");
        };

        assert!(!convo.load_finished(stale, vec![entry(1)]));
        assert!(convo.entries().is_empty(), "stale data never lands");
        assert_eq!(convo.phase(), Phase::Initializing(SearchMode::Vector));

        assert!(convo.load_finished(current, vec![entry(2)]));
        assert_eq!(convo.phase(), Phase::Ready(SearchMode::Vector));
        assert_eq!(convo.entries(), [entry(2)]);
    }

    #[test]
    fn test_load_failure_still_reaches_ready() {
        let mut convo = Conversation::new();
        let effects = convo.select_mode(SearchMode::Chat);
        let Effect::LoadHistory { generation, .. } = effects[0] else {
            panic!("expected load");
        };

        assert!(convo.load_failed(generation, "connection failed".to_string()));
        assert_eq!(convo.phase(), Phase::Ready(SearchMode::Chat));
        assert!(convo.entries().is_empty());
        assert_eq!(convo.take_error().as_deref(), Some("connection failed"));
        assert_eq!(convo.take_error(), None, "error is surfaced once");
    }

    #[test]
    fn test_submit_guards() {
        let mut convo = Conversation::new();
        assert!(matches!(
            convo.submit("hi"),
            Err(ConversationError::NoModeSelected)
        ));

        convo.select_mode(SearchMode::Fulltext);
        assert!(matches!(
            convo.submit("hi"),
            Err(ConversationError::ModeInitializing)
        ));

        let mut convo = ready_conversation(SearchMode::Fulltext);
        assert!(matches!(
            convo.submit("  \n "),
            Err(ConversationError::EmptyPrompt)
        ));

        convo.submit("first").unwrap();
        assert!(matches!(
            convo.submit("second"),
            Err(ConversationError::PromptInFlight)
        ));
    }

    #[test]
    fn test_prompt_round_trip_appends_last() {
        // Scenario: session abc123, empty corpus, mode `list`.
        let mut convo = ready_conversation(SearchMode::Fulltext);
        assert!(convo.can_submit());

        let effect = convo.submit("define X").unwrap();
        let Effect::SubmitPrompt {
            mode,
            ref prompt,
            generation,
        } = effect
        else {
            panic!("expected prompt effect");
        };
        assert_eq!(mode, SearchMode::Fulltext);
        assert_eq!(prompt, "define X");
        assert!(convo.is_waiting());

        assert!(convo.prompt_finished(generation, HistoryEntry::new("define X", "X is...")));
        assert!(!convo.is_waiting());
        assert_eq!(convo.entries(), [HistoryEntry::new("define X", "X is...")]);
    }

    #[test]
    fn test_stale_prompt_completion_is_discarded() {
        let mut convo = ready_conversation(SearchMode::Fulltext);
        let Effect::SubmitPrompt { generation, .. } = convo.submit("q").unwrap() else {
            panic!("expected prompt effect");
        };

        // Mode switched away before the completion landed.
        convo.select_mode(SearchMode::Vector);
        assert!(!convo.prompt_finished(generation, entry(1)));
        assert!(convo.entries().is_empty());
    }

    #[test]
    fn test_prompt_failure_clears_waiting() {
        let mut convo = ready_conversation(SearchMode::Chat);
        let Effect::SubmitPrompt { generation, .. } = convo.submit("q").unwrap() else {
            panic!("expected prompt effect");
        };

        assert!(convo.prompt_failed(generation, "HTTP 500".to_string()));
        assert!(!convo.is_waiting());
        assert!(convo.can_submit(), "submission re-enabled after failure");
        assert_eq!(convo.take_error().as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn test_flush_effect_only_when_there_is_something_to_save() {
        let mut convo = Conversation::new();
        assert_eq!(convo.flush_effect(), None);

        let mut convo = ready_conversation(SearchMode::Fulltext);
        assert_eq!(convo.flush_effect(), None);

        let Effect::SubmitPrompt { generation, .. } = convo.submit("q").unwrap() else {
            panic!("expected prompt effect");
        };
        convo.prompt_finished(generation, entry(1));
        assert_eq!(
            convo.flush_effect(),
            Some(Effect::SaveHistory {
                mode: SearchMode::Fulltext,
                entries: vec![entry(1)],
            })
        );
    }

    /// Drives a conversation against an in-memory store the way the bridge
    /// drives it against the backend: effects executed in emission order.
    fn run_effects(
        convo: &mut Conversation,
        effects: Vec<Effect>,
        store: &mut HashMap<SearchMode, Vec<HistoryEntry>>,
    ) {
        for effect in effects {
            match effect {
                Effect::SaveHistory { mode, entries } => {
                    store.insert(mode, entries);
                }
                Effect::LoadHistory { mode, generation } => {
                    let entries = store.get(&mode).cloned().unwrap_or_default();
                    convo.load_finished(generation, entries);
                }
                Effect::SubmitPrompt { .. } => unreachable!("not used here"),
            }
        }
    }

    #[test]
    fn test_mode_round_trip_restores_history() {
        let mut store = HashMap::new();
        let mut convo = Conversation::new();

        let effects = convo.select_mode(SearchMode::Fulltext);
        run_effects(&mut convo, effects, &mut store);

        let Effect::SubmitPrompt { generation, .. } = convo.submit("q").unwrap() else {
            panic!("expected prompt effect");
        };
        convo.prompt_finished(generation, entry(1));

        // Fulltext -> Vector -> Fulltext: the save completed before the
        // subsequent load began, so history must be restored intact.
        let effects = convo.select_mode(SearchMode::Vector);
        run_effects(&mut convo, effects, &mut store);
        assert!(convo.entries().is_empty());

        let effects = convo.select_mode(SearchMode::Fulltext);
        run_effects(&mut convo, effects, &mut store);
        assert_eq!(convo.entries(), [entry(1)]);
    }

    proptest! {
        #[test]
        fn prop_appending_never_removes_or_reorders(count in 1usize..20) {
            let mut convo = ready_conversation(SearchMode::Chat);
            let mut expected = Vec::new();

            for n in 0..count {
                let Effect::SubmitPrompt { generation, .. } =
                    convo.submit(&format!("prompt {}", n)).unwrap()
                else {
                    panic!("expected prompt effect");
                };
                let before = convo.entries().to_vec();
                convo.prompt_finished(generation, entry(n));

                // Existing entries are untouched; the new one is last.
                prop_assert_eq!(&convo.entries()[..before.len()], &before[..]);
                expected.push(entry(n));
                prop_assert_eq!(convo.entries(), &expected[..]);
            }
        }
    }
}
