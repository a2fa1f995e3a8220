//! Play history for shuffle mode
//!
//! Stack of queue indices played before the current one, enabling reversible
//! "previous" navigation without re-randomizing.

/// Play history (most recent = back)
///
/// Unbounded: while shuffle is active every index not current and not upcoming
/// must be somewhere in the history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    indices: Vec<usize>,
}

impl History {
    /// Create empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a played index
    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    /// Pop the most recent index for "previous"
    pub fn pop(&mut self) -> Option<usize> {
        self.indices.pop()
    }

    /// All indices, oldest first
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Number of indices in history
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.indices.clear();
    }
}
