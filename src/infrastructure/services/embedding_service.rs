//! Batched embedding of log texts with cost accounting

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::analysis::AnalysisError;
use crate::domain::embedding::{
    split_batches, BatchDispatcher, EmbeddingProvider, SequentialDispatcher,
};
use crate::domain::usage::CostAccountant;
use crate::infrastructure::observability::{
    record_provider_request, record_provider_tokens, ProviderKind,
};

/// Embeds texts in bounded batches and forwards token usage to the accountant
#[derive(Debug, Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    dispatcher: Arc<dyn BatchDispatcher>,
    model: String,
    batch_size: usize,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>, batch_size: usize) -> Self {
        Self {
            provider,
            dispatcher: Arc::new(SequentialDispatcher),
            model: model.into(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn BatchDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One vector per text, in input order.
    ///
    /// Token usage of every batch that completed is recorded even when a
    /// later batch fails.
    pub async fn embed(
        &self,
        texts: Vec<String>,
        costs: &mut CostAccountant,
    ) -> Result<Vec<Vec<f32>>, AnalysisError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let expected = texts.len();
        let batches = split_batches(texts, self.batch_size);
        debug!(
            model = %self.model,
            texts = expected,
            batches = batches.len(),
            provider = self.provider.provider_name(),
            "Dispatching embedding batches"
        );

        let mut outcome = self
            .dispatcher
            .dispatch(self.provider.as_ref(), &self.model, batches)
            .await;
        outcome.completed.sort_by_key(|batch| batch.index);

        for batch in &outcome.completed {
            record_provider_request(ProviderKind::Embedding, &self.model, true);
            record_provider_tokens(ProviderKind::Embedding, &self.model, "input", u64::from(batch.tokens));
            costs.record_embedding(&self.model, batch.tokens)?;
        }

        if let Some(failure) = outcome.failure {
            record_provider_request(ProviderKind::Embedding, &self.model, false);
            return Err(failure);
        }

        let vectors: Vec<Vec<f32>> = outcome
            .completed
            .into_iter()
            .flat_map(|batch| batch.vectors)
            .collect();

        if vectors.len() != expected {
            return Err(AnalysisError::internal(format!(
                "Embedded {} of {} texts",
                vectors.len(),
                expected
            )));
        }

        info!(model = %self.model, vectors = vectors.len(), "Embeddings generated");
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::usage::PricingTable;

    const MODEL: &str = "text-embedding-3-small";

    fn accountant() -> CostAccountant {
        CostAccountant::new(Arc::new(PricingTable::with_defaults()))
    }

    fn texts(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("log line {}", i)).collect()
    }

    #[tokio::test]
    async fn test_batches_and_records_tokens() {
        let provider = Arc::new(MockEmbeddingProvider::new(8).with_tokens_per_input(5));
        let service = EmbeddingService::new(provider.clone(), MODEL, 200);
        let mut costs = accountant();

        let vectors = service.embed(texts(450), &mut costs).await.unwrap();

        assert_eq!(vectors.len(), 450);
        assert_eq!(provider.batch_sizes(), vec![200, 200, 50]);
        let record = costs.total();
        assert_eq!(record.embedding_tokens, 450 * 5);
        assert!(record.embedding_cost > 0.0);
    }

    #[tokio::test]
    async fn test_order_is_preserved_across_batches() {
        let provider = Arc::new(
            MockEmbeddingProvider::new(2)
                .with_vector("log line 0", vec![1.0, 0.0])
                .with_vector("log line 2", vec![0.0, 1.0]),
        );
        let service = EmbeddingService::new(provider, MODEL, 2);

        let vectors = service.embed(texts(3), &mut accountant()).await.unwrap();

        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert_eq!(vectors[2], vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_failure_keeps_completed_batch_costs() {
        let provider = Arc::new(
            MockEmbeddingProvider::new(4)
                .with_tokens_per_input(10)
                .with_error_on_call(3, "HTTP 500"),
        );
        let service = EmbeddingService::new(provider.clone(), MODEL, 2);
        let mut costs = accountant();

        let err = service.embed(texts(8), &mut costs).await.unwrap_err();

        assert!(matches!(err, AnalysisError::EmbeddingService { batch_index: 2, .. }));
        assert_eq!(provider.call_count(), 3);
        assert_eq!(costs.total().embedding_tokens, 40);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_call() {
        let provider = Arc::new(MockEmbeddingProvider::new(4));
        let service = EmbeddingService::new(provider.clone(), MODEL, 10);

        let vectors = service.embed(Vec::new(), &mut accountant()).await.unwrap();

        assert!(vectors.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unpriced_model_is_rejected() {
        let provider = Arc::new(MockEmbeddingProvider::new(4));
        let service = EmbeddingService::new(provider, "unpriced-embedder", 10);

        let err = service.embed(texts(1), &mut accountant()).await.unwrap_err();

        assert!(matches!(err, AnalysisError::UnknownPricingModel(_)));
    }
}
