//! Back/forward state machine.

use tracing::debug;

use super::ViewState;

/// Ordered, truncatable log of views with a cursor.
///
/// The log is never empty and `current_index` always points inside it.
/// `current` is the view being displayed, which replays may change without
/// touching the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationHistory {
    entries: Vec<ViewState>,
    current_index: usize,
    current: ViewState,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self {
            entries: vec![ViewState::initial()],
            current_index: 0,
            current: ViewState::initial(),
        }
    }

    /// Rebuild from a stored log with the cursor at the tail.
    /// An empty log gives a fresh history.
    pub fn from_entries(entries: Vec<ViewState>) -> Self {
        match entries.last().cloned() {
            Some(current) => Self {
                current_index: entries.len() - 1,
                entries,
                current,
            },
            None => Self::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Display `view`. With `add_to_history`, everything after the cursor is
    /// dropped and `view` becomes the new tail.
    pub fn push(&mut self, view: ViewState, add_to_history: bool) -> &ViewState {
        if add_to_history {
            self.entries.truncate(self.current_index + 1);
            self.entries.push(view.clone());
            self.current_index = self.entries.len() - 1;
            debug!(index = self.current_index, len = self.entries.len(), "History push");
        }
        self.current = view;
        &self.current
    }

    /// Step back one entry. `None` when already at the start.
    pub fn back(&mut self) -> Option<&ViewState> {
        if !self.can_go_back() {
            return None;
        }
        self.current_index -= 1;
        Some(self.replay())
    }

    /// Step forward one entry. `None` when already at the tail.
    pub fn forward(&mut self) -> Option<&ViewState> {
        if !self.can_go_forward() {
            return None;
        }
        self.current_index += 1;
        Some(self.replay())
    }

    fn replay(&mut self) -> &ViewState {
        let view = self.entries[self.current_index].clone();
        self.push(view, false)
    }

    pub fn current(&self) -> &ViewState {
        &self.current
    }

    pub fn entries(&self) -> &[ViewState] {
        &self.entries
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current_index + 1 < self.entries.len()
    }
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new()
    }
}
