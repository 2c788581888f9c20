//! Per-request cost accumulation

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::PricingTable;
use crate::domain::analysis::AnalysisError;

/// Tokens and USD spent by one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostRecord {
    pub embedding_tokens: u64,
    pub embedding_cost: f64,
    pub llm_input_tokens: u64,
    pub llm_output_tokens: u64,
    pub llm_cost: f64,
    pub total_cost: f64,
}

/// Accumulates costs for a single request against a shared pricing table
#[derive(Debug)]
pub struct CostAccountant {
    pricing: Arc<PricingTable>,
    record: CostRecord,
}

impl CostAccountant {
    pub fn new(pricing: Arc<PricingTable>) -> Self {
        Self {
            pricing,
            record: CostRecord::default(),
        }
    }

    /// Add an embedding call; returns the cost of this call
    pub fn record_embedding(&mut self, model: &str, tokens: u32) -> Result<f64, AnalysisError> {
        let cost = self.pricing.get(model)?.input_cost(tokens);

        self.record.embedding_tokens += u64::from(tokens);
        self.record.embedding_cost += cost;
        self.refresh_total();

        debug!(model, tokens, cost, "Recorded embedding cost");
        Ok(cost)
    }

    /// Add a chat completion call; returns the cost of this call
    pub fn record_llm(
        &mut self,
        model: &str,
        input_tokens: u32,
        output_tokens: u32,
    ) -> Result<f64, AnalysisError> {
        let pricing = self.pricing.get(model)?;
        let cost = pricing.input_cost(input_tokens) + pricing.output_cost(output_tokens);

        self.record.llm_input_tokens += u64::from(input_tokens);
        self.record.llm_output_tokens += u64::from(output_tokens);
        self.record.llm_cost += cost;
        self.refresh_total();

        debug!(model, input_tokens, output_tokens, cost, "Recorded LLM cost");
        Ok(cost)
    }

    pub fn total(&self) -> CostRecord {
        self.record.clone()
    }

    fn refresh_total(&mut self) {
        self.record.total_cost = self.record.embedding_cost + self.record.llm_cost;
    }
}
