//! Token pricing and per-request cost accounting

mod cost;
mod pricing;
mod tokens;

pub use cost::{CostAccountant, CostRecord};
pub use pricing::{ModelPricing, PricingTable};
pub use tokens::estimate_tokens;
