//! Model pricing configuration

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::analysis::AnalysisError;

/// Price of a model in USD per 1K tokens.
///
/// Embedding models only bill input tokens, so their output rate is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_price_per_1k: f64,
    #[serde(default)]
    pub output_price_per_1k: f64,
}

impl ModelPricing {
    pub fn new(input_price_per_1k: f64, output_price_per_1k: f64) -> Self {
        Self {
            input_price_per_1k,
            output_price_per_1k,
        }
    }

    pub fn embedding(price_per_1k: f64) -> Self {
        Self::new(price_per_1k, 0.0)
    }

    pub fn input_cost(&self, tokens: u32) -> f64 {
        tokens as f64 / 1000.0 * self.input_price_per_1k
    }

    pub fn output_cost(&self, tokens: u32) -> f64 {
        tokens as f64 / 1000.0 * self.output_price_per_1k
    }
}

const EMBEDDING_PRICES: &[(&str, f64)] = &[
    ("text-embedding-3-small", 0.00002),
    ("text-embedding-3-large", 0.00013),
    ("text-embedding-ada-002", 0.0001),
];

const CHAT_PRICES: &[(&str, f64, f64)] = &[
    ("gpt-3.5-turbo", 0.0005, 0.0015),
    ("gpt-3.5-turbo-0125", 0.0005, 0.0015),
    ("gpt-3.5-turbo-instruct", 0.0015, 0.002),
    ("gpt-4", 0.03, 0.06),
    ("gpt-4-32k", 0.06, 0.12),
    ("gpt-4-turbo", 0.01, 0.03),
    ("gpt-4-turbo-preview", 0.01, 0.03),
    ("gpt-4o", 0.005, 0.015),
    ("gpt-4o-mini", 0.00015, 0.0006),
];

/// Immutable model id to price lookup, built once at startup
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    models: HashMap<String, ModelPricing>,
}

impl PricingTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in prices for the OpenAI embedding and chat models
    pub fn with_defaults() -> Self {
        let mut models = HashMap::new();

        for (model, price) in EMBEDDING_PRICES {
            models.insert((*model).to_string(), ModelPricing::embedding(*price));
        }
        for (model, input, output) in CHAT_PRICES {
            models.insert((*model).to_string(), ModelPricing::new(*input, *output));
        }

        Self { models }
    }

    /// Add or replace prices
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, ModelPricing)>,
        S: Into<String>,
    {
        for (model, pricing) in overrides {
            self.models.insert(model.into(), pricing);
        }
        self
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Look up a model; unknown models are an error, never a zero price
    pub fn get(&self, model: &str) -> Result<&ModelPricing, AnalysisError> {
        self.models
            .get(model)
            .ok_or_else(|| AnalysisError::unknown_pricing_model(model))
    }

    /// Fail on the first model in `models` without a price
    pub fn ensure_priced<'a>(
        &self,
        models: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), AnalysisError> {
        models.into_iter().try_for_each(|model| self.get(model).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prices() {
        let table = PricingTable::with_defaults();

        let embedding = table.get("text-embedding-3-small").unwrap();
        assert_eq!(embedding.input_price_per_1k, 0.00002);
        assert_eq!(embedding.output_price_per_1k, 0.0);

        let chat = table.get("gpt-4o-mini").unwrap();
        assert_eq!(chat.input_price_per_1k, 0.00015);
        assert_eq!(chat.output_price_per_1k, 0.0006);
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let table = PricingTable::with_defaults();

        let err = table.get("gpt-unknown").unwrap_err();

        assert!(matches!(err, AnalysisError::UnknownPricingModel(ref m) if m == "gpt-unknown"));
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let table = PricingTable::with_defaults().with_overrides([
            ("gpt-4o-mini", ModelPricing::new(1.0, 2.0)),
            ("local-model", ModelPricing::new(0.0, 0.0)),
        ]);

        assert_eq!(table.get("gpt-4o-mini").unwrap().output_price_per_1k, 2.0);
        assert!(table.contains("local-model"));
    }

    #[test]
    fn test_ensure_priced() {
        let table = PricingTable::with_defaults();

        assert!(table.ensure_priced(["text-embedding-3-small", "gpt-4o-mini"]).is_ok());
        assert!(table.ensure_priced(["gpt-4o-mini", "mystery"]).is_err());
    }

    #[test]
    fn test_cost_formula() {
        let pricing = ModelPricing::new(0.00015, 0.0006);

        assert!((pricing.input_cost(2000) - 0.0003).abs() < 1e-12);
        assert!((pricing.output_cost(500) - 0.0003).abs() < 1e-12);
        assert_eq!(pricing.input_cost(0), 0.0);
    }
}
