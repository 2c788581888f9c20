//! Embedding response types

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A single embedding vector tagged with its position in the batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    index: usize,
    embedding: Vec<f32>,
}

impl Embedding {
    pub fn new(index: usize, embedding: Vec<f32>) -> Self {
        Self { index, embedding }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn vector(&self) -> &[f32] {
        &self.embedding
    }

    pub fn into_vector(self) -> Vec<f32> {
        self.embedding
    }
}

/// Cosine similarity between two vectors.
///
/// Mismatched lengths, empty vectors and zero-norm vectors yield 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Token usage reported for an embedding call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

impl EmbeddingUsage {
    pub fn new(prompt_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            total_tokens,
        }
    }

    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Response from an embedding call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    model: String,
    data: Vec<Embedding>,
    usage: Option<EmbeddingUsage>,
}

impl EmbeddingResponse {
    pub fn new(model: String, data: Vec<Embedding>, usage: Option<EmbeddingUsage>) -> Self {
        Self { model, data, usage }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.data
    }

    /// Usage as reported by the provider, if it sent any
    pub fn usage(&self) -> Option<&EmbeddingUsage> {
        self.usage.as_ref()
    }

    /// Consume the response into vectors ordered by their reported index.
    ///
    /// Fails unless the indices are exactly `0..expected`.
    pub fn into_ordered_vectors(self, expected: usize) -> Result<Vec<Vec<f32>>, DomainError> {
        if self.data.len() != expected {
            return Err(DomainError::provider(
                "embedding",
                format!(
                    "Expected {} embeddings, received {}",
                    expected,
                    self.data.len()
                ),
            ));
        }

        let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
        for item in self.data {
            let index = item.index();
            match slots.get_mut(index) {
                Some(slot @ None) => *slot = Some(item.into_vector()),
                Some(Some(_)) => {
                    return Err(DomainError::provider(
                        "embedding",
                        format!("Duplicate embedding index {}", index),
                    ));
                }
                None => {
                    return Err(DomainError::provider(
                        "embedding",
                        format!("Embedding index {} out of range", index),
                    ));
                }
            }
        }

        // Every slot is filled: count matched and no index repeated
        Ok(slots.into_iter().flatten().collect())
    }
}
