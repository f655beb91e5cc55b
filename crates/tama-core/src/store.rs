use std::time::Duration;

use tama_ai::ChatMessage;

use crate::error::SessionError;
use crate::turn::Turn;

/// Ordered turns plus the two cursors into them.
///
/// `current` is what the user is looking at; `target` is what the active
/// dispatch writes into. They start out equal at submission and diverge as
/// soon as the user navigates while a response streams in.
#[derive(Clone, Debug, Default)]
pub struct TurnStore {
    turns: Vec<Turn>,
    current: Option<usize>,
    target: Option<usize>,
    accumulator: String,
}

impl TurnStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn target_index(&self) -> Option<usize> {
        self.target
    }

    pub fn current(&self) -> Option<&Turn> {
        self.current.and_then(|index| self.turns.get(index))
    }

    pub(crate) fn set_current(&mut self, index: usize) {
        if index < self.turns.len() {
            self.current = Some(index);
        }
    }

    /// Index of the one turn that is neither finalized, cancelled nor failed.
    pub fn pending_index(&self) -> Option<usize> {
        self.turns.iter().position(Turn::is_pending)
    }

    /// Streaming text for the pending turn; not part of any `Turn`.
    pub fn accumulator(&self) -> &str {
        &self.accumulator
    }

    pub(crate) fn set_accumulator(&mut self, text: String) {
        self.accumulator = text;
    }

    pub(crate) fn clear_accumulator(&mut self) {
        self.accumulator.clear();
    }

    pub fn submit(&mut self, request: &str) -> Result<usize, SessionError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(SessionError::InvalidInput);
        }
        if self.pending_index().is_some() {
            return Err(SessionError::DispatchActive);
        }

        self.turns.push(Turn::new(request));
        let index = self.turns.len() - 1;
        self.current = Some(index);
        self.target = Some(index);
        self.accumulator.clear();
        Ok(index)
    }

    /// Writes the final response. Out-of-range targets (a reset happened
    /// while the dispatch was in flight) and settled turns are ignored.
    pub fn finalize(&mut self, target: usize, response: &str, duration: Duration) -> bool {
        match self.turns.get_mut(target) {
            Some(turn) => turn.finalize(response, duration),
            None => false,
        }
    }

    pub(crate) fn mark_truncated(&mut self, index: usize, reason: &str) {
        if let Some(turn) = self.turns.get_mut(index) {
            turn.mark_truncated(reason);
        }
    }

    pub fn cancel(&mut self, index: usize) -> bool {
        match self.turns.get_mut(index) {
            Some(turn) => turn.cancel(),
            None => false,
        }
    }

    pub fn fail(&mut self, index: usize, cause: &str) -> bool {
        match self.turns.get_mut(index) {
            Some(turn) => turn.fail(cause),
            None => false,
        }
    }

    /// Outbound conversation, oldest first. Cancelled and failed turns are
    /// left out entirely so they have no influence on later requests.
    pub fn build_history(&self) -> Vec<ChatMessage> {
        let mut history = Vec::with_capacity(self.turns.len() * 2);
        for turn in self.turns.iter().filter(|turn| turn.counts_in_history()) {
            history.push(ChatMessage::user(turn.request()));
            if !turn.response().is_empty() {
                history.push(ChatMessage::assistant(turn.response()));
            }
        }
        history
    }

    pub fn reset(&mut self) {
        self.turns.clear();
        self.current = None;
        self.target = None;
        self.accumulator.clear();
    }
}
