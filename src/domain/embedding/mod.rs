//! Embedding provider domain models, traits and batch dispatch

mod dispatch;
mod provider;
mod request;
mod response;

pub use dispatch::{
    split_batches, BatchDispatcher, CompletedBatch, DispatchOutcome, EmbeddingBatch,
    SequentialDispatcher,
};
pub use provider::EmbeddingProvider;
pub use request::EmbeddingRequest;
pub use response::{cosine_similarity, Embedding, EmbeddingResponse, EmbeddingUsage};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
