//! Analysis pipeline state machine

mod stage;

pub use stage::{PipelineStage, PipelineTracker};
