use std::sync::Arc;

use crate::domain::log::NormalizedLogEntry;

/// A log entry with its cosine similarity to the prompt and its 1-based rank
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLogEntry {
    entry: Arc<NormalizedLogEntry>,
    similarity: f32,
    rank: usize,
}

impl ScoredLogEntry {
    pub fn new(entry: Arc<NormalizedLogEntry>, similarity: f32, rank: usize) -> Self {
        Self {
            entry,
            similarity,
            rank,
        }
    }

    pub fn entry(&self) -> &NormalizedLogEntry {
        &self.entry
    }

    /// Shared handle to the underlying entry
    pub fn entry_arc(&self) -> &Arc<NormalizedLogEntry> {
        &self.entry
    }

    pub fn similarity(&self) -> f32 {
        self.similarity
    }

    pub fn rank(&self) -> usize {
        self.rank
    }
}
