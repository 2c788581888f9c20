//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed every input of the request in a single external call
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::embedding::{Embedding, EmbeddingUsage};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Deterministic embedding provider with scripted vectors and failures
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        vectors: HashMap<String, Vec<f32>>,
        fail_on_call: Option<(usize, String)>,
        tokens_per_input: u32,
        drop_last: bool,
        reverse_order: bool,
        report_usage: bool,
        reject_blank: bool,
        calls: AtomicUsize,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                vectors: HashMap::new(),
                fail_on_call: None,
                tokens_per_input: 10,
                drop_last: false,
                reverse_order: false,
                report_usage: true,
                reject_blank: false,
                calls: AtomicUsize::new(0),
                batch_sizes: Mutex::new(Vec::new()),
            }
        }

        /// Return `vector` whenever `text` is embedded
        pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.into(), vector);
            self
        }

        /// Fail the `call`-th request (1-based)
        pub fn with_error_on_call(mut self, call: usize, error: impl Into<String>) -> Self {
            self.fail_on_call = Some((call, error.into()));
            self
        }

        pub fn with_tokens_per_input(mut self, tokens: u32) -> Self {
            self.tokens_per_input = tokens;
            self
        }

        /// Return one vector fewer than requested
        pub fn with_missing_vector(mut self) -> Self {
            self.drop_last = true;
            self
        }

        /// Return vectors in reverse index order
        pub fn with_reversed_order(mut self) -> Self {
            self.reverse_order = true;
            self
        }

        /// Omit `usage` from every response
        pub fn without_usage(mut self) -> Self {
            self.report_usage = false;
            self
        }

        /// Reject any request containing an empty or whitespace-only input
        pub fn with_blank_input_rejected(mut self) -> Self {
            self.reject_blank = true;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn batch_sizes(&self) -> Vec<usize> {
            self.batch_sizes.lock().unwrap().clone()
        }

        fn vector_for(&self, text: &str) -> Vec<f32> {
            if let Some(vector) = self.vectors.get(text) {
                return vector.clone();
            }

            let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
            (0..self.dimensions)
                .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                .collect()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.batch_sizes.lock().unwrap().push(request.len());

            if let Some((fail_call, error)) = &self.fail_on_call {
                if *fail_call == call {
                    return Err(DomainError::provider("mock", error));
                }
            }

            if self.reject_blank && request.inputs().iter().any(|t| t.trim().is_empty()) {
                return Err(DomainError::provider("mock", "input must not be empty"));
            }

            let mut embeddings: Vec<Embedding> = request
                .inputs()
                .iter()
                .enumerate()
                .map(|(idx, text)| Embedding::new(idx, self.vector_for(text)))
                .collect();

            if self.drop_last {
                embeddings.pop();
            }
            if self.reverse_order {
                embeddings.reverse();
            }

            let tokens = self.tokens_per_input * request.len() as u32;

            Ok(EmbeddingResponse::new(
                request.model().to_string(),
                embeddings,
                self.report_usage.then(|| EmbeddingUsage::new(tokens, tokens)),
            ))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_scripted_vectors() {
            let provider = MockEmbeddingProvider::new(2).with_vector("hello", vec![1.0, 0.0]);
            let request = EmbeddingRequest::new("mock", vec!["hello".into(), "world".into()]);

            let response = provider.embed(request).await.unwrap();

            assert_eq!(response.embeddings()[0].vector(), &[1.0, 0.0]);
            assert_eq!(response.embeddings()[1].vector().len(), 2);
            assert_eq!(response.usage().map(|u| u.total_tokens()), Some(20));
            assert_eq!(provider.call_count(), 1);
        }

        #[tokio::test]
        async fn test_mock_provider_fails_on_scripted_call() {
            let provider = MockEmbeddingProvider::new(2).with_error_on_call(2, "rate limited");

            assert!(provider.embed(EmbeddingRequest::new("m", vec!["a".into()])).await.is_ok());
            assert!(provider.embed(EmbeddingRequest::new("m", vec!["b".into()])).await.is_err());
            assert_eq!(provider.batch_sizes(), vec![1, 1]);
        }

        #[tokio::test]
        async fn test_mock_provider_rejects_blank_input() {
            let provider = MockEmbeddingProvider::new(2).with_blank_input_rejected();

            let result = provider
                .embed(EmbeddingRequest::new("m", vec!["ok".into(), " ".into()]))
                .await;

            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_provider_without_usage() {
            let provider = MockEmbeddingProvider::new(2).without_usage();

            let response = provider
                .embed(EmbeddingRequest::new("m", vec!["a".into()]))
                .await
                .unwrap();

            assert!(response.usage().is_none());
        }
    }
}
