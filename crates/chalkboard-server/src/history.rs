//! Bounded board history replayed to late joiners.

use chalkboard_core::event::DrawEvent;
use chalkboard_core::protocol::{HistoryEntry, ServerMessage};
use std::collections::VecDeque;

/// Default number of draw events kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 5000;

/// Draw events since the last clear, oldest first.
///
/// A clear empties the log, so the log itself never holds clear entries.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    events: VecDeque<DrawEvent>,
    limit: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryLog {
    pub fn new(limit: usize) -> Self {
        Self {
            events: VecDeque::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Append, dropping the oldest events beyond the limit.
    pub fn push(&mut self, event: DrawEvent) {
        if self.limit == 0 {
            return;
        }
        while self.events.len() >= self.limit {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// The `history` message for a new connection.
    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::history(self.events.iter().copied().map(HistoryEntry::Draw))
    }
}
