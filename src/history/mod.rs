//! Stack of state snapshots used to step backward.
//!
//! A snapshot is an owned deep copy: engines clone their state before mutating it, and nothing
//! in the stored value is shared with the live state.

/// per engine stack of states, last pushed is first restored
#[derive(Debug, Clone)]
pub struct HistoryStore<S> {
    snapshots: Vec<S>,
}

impl<S> HistoryStore<S>
where
    S: Clone,
{
    pub fn new() -> Self {
        HistoryStore {
            snapshots: Vec::new(),
        }
    }

    /// record a state
    pub fn push(&mut self, state: S) {
        self.snapshots.push(state);
    }

    /// remove and return last recorded state
    pub fn pop(&mut self) -> Option<S> {
        self.snapshots.pop()
    }

    /// last recorded state, if any
    pub fn peek(&self) -> Option<&S> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// drop all recorded states
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
} // end of impl HistoryStore

impl<S: Clone> Default for HistoryStore<S> {
    fn default() -> Self {
        HistoryStore::new()
    }
}

//========================================================

// end of mod tests
