//! Domain layer - Core analysis logic and entities

pub mod analysis;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod log;
pub mod pipeline;
pub mod ranking;
pub mod usage;

pub use analysis::{AnalysisError, AnalysisResult, AnalysisStatus};
pub use error::DomainError;
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage};
pub use log::{InputFormat, NormalizedLogEntry, RawLogRecord};
pub use usage::{CostAccountant, CostRecord, ModelPricing, PricingTable};
