//! Cosine similarity ranker

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use super::ScoredLogEntry;
use crate::domain::analysis::AnalysisError;
use crate::domain::embedding::cosine_similarity;
use crate::domain::log::NormalizedLogEntry;

/// Ranks entries by similarity to a prompt embedding and keeps the top N
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker {
    top_n: usize,
}

impl SimilarityRanker {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Score every entry, sort descending (stable, so ties keep file order)
    /// and truncate to `top_n`. A `top_n` larger than the input is clamped.
    pub fn rank(
        &self,
        prompt_embedding: &[f32],
        entries: &[Arc<NormalizedLogEntry>],
        embeddings: &[Vec<f32>],
    ) -> Result<Vec<ScoredLogEntry>, AnalysisError> {
        if entries.len() != embeddings.len() {
            return Err(AnalysisError::internal(format!(
                "Cannot rank {} entries with {} embeddings",
                entries.len(),
                embeddings.len()
            )));
        }

        let mut scored: Vec<(usize, f32)> = embeddings
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, similarity(prompt_embedding, vector)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(self.top_n.min(entries.len()));

        debug!(
            total = entries.len(),
            kept = scored.len(),
            best = scored.first().map(|(_, s)| *s),
            "Ranked log entries by similarity"
        );

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(rank, (position, score))| {
                ScoredLogEntry::new(Arc::clone(&entries[position]), score, rank + 1)
            })
            .collect())
    }
}

fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let score = cosine_similarity(a, b);
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
