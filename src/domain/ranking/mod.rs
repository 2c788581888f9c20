//! Semantic similarity ranking of log entries against an incident prompt

mod ranker;
mod scored;

pub use ranker::SimilarityRanker;
pub use scored::ScoredLogEntry;
