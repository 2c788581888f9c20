//! Batch dispatch strategies for embedding calls

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, warn};

use super::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::analysis::AnalysisError;
use crate::domain::usage::estimate_tokens;

/// A contiguous slice of the texts to embed
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    pub index: usize,
    pub texts: Vec<String>,
}

/// Vectors of one successful batch, in input order
#[derive(Debug, Clone)]
pub struct CompletedBatch {
    pub index: usize,
    pub vectors: Vec<Vec<f32>>,
    pub tokens: u32,
}

/// Result of dispatching a batch set.
///
/// `completed` holds every batch that finished before `failure`, so their
/// token usage can still be accounted for.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub completed: Vec<CompletedBatch>,
    pub failure: Option<AnalysisError>,
}

/// Split `texts` into batches of at most `batch_size` items
pub fn split_batches(texts: Vec<String>, batch_size: usize) -> Vec<EmbeddingBatch> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(texts.len().div_ceil(batch_size));
    let mut iter = texts.into_iter().peekable();

    while iter.peek().is_some() {
        let texts: Vec<String> = iter.by_ref().take(batch_size).collect();
        batches.push(EmbeddingBatch {
            index: batches.len(),
            texts,
        });
    }

    batches
}

/// Strategy for sending batches to a provider
#[async_trait]
pub trait BatchDispatcher: Send + Sync + Debug {
    async fn dispatch(
        &self,
        provider: &dyn EmbeddingProvider,
        model: &str,
        batches: Vec<EmbeddingBatch>,
    ) -> DispatchOutcome;
}

/// Sends batches one after another and stops at the first failure
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialDispatcher;

#[async_trait]
impl BatchDispatcher for SequentialDispatcher {
    async fn dispatch(
        &self,
        provider: &dyn EmbeddingProvider,
        model: &str,
        batches: Vec<EmbeddingBatch>,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let total = batches.len();

        for batch in batches {
            let expected = batch.texts.len();
            let estimated: u32 = batch.texts.iter().map(|t| estimate_tokens(t)).sum();
            let request = EmbeddingRequest::new(model, batch.texts);

            let result = provider
                .embed(request)
                .await
                .and_then(|response| {
                    let tokens = match response.usage() {
                        Some(usage) => usage.total_tokens(),
                        None => {
                            debug!(
                                batch = batch.index,
                                estimated,
                                "Provider omitted usage, estimating tokens from text"
                            );
                            estimated
                        }
                    };
                    response
                        .into_ordered_vectors(expected)
                        .map(|vectors| (vectors, tokens))
                });

            match result {
                Ok((vectors, tokens)) => {
                    debug!(
                        batch = batch.index + 1,
                        total,
                        size = expected,
                        tokens,
                        "Embedding batch completed"
                    );
                    outcome.completed.push(CompletedBatch {
                        index: batch.index,
                        vectors,
                        tokens,
                    });
                }
                Err(e) => {
                    warn!(batch = batch.index, error = %e, "Embedding batch failed");
                    outcome.failure = Some(AnalysisError::embedding_service(batch.index, e));
                    break;
                }
            }
        }

        outcome
    }
}
