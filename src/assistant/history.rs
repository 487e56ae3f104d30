use std::collections::VecDeque;

use crate::backend::ConversationTurn;

/// Maximum number of turns kept and sent to the backend
pub const DEFAULT_HISTORY_LIMIT: usize = 40;

/// In-memory sliding window of conversation turns.
///
/// Oldest turns are evicted first; the cap is enforced on every push and
/// never exceeds [`DEFAULT_HISTORY_LIMIT`].
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    limit: usize,
}

impl ConversationHistory {
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, DEFAULT_HISTORY_LIMIT);
        Self {
            turns: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.limit {
            self.turns.pop_front();
        }
    }

    /// Contiguous copy in chronological order, ready to serialize.
    pub fn to_vec(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
