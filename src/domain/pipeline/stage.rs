use std::fmt;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::analysis::AnalysisError;

/// Stage of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Normalized,
    Embedded,
    Ranked,
    Analyzed,
    Completed,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Normalized => "normalized",
            Self::Embedded => "embedded",
            Self::Ranked => "ranked",
            Self::Analyzed => "analyzed",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// The only forward successor of this stage
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Normalized),
            Self::Normalized => Some(Self::Embedded),
            Self::Embedded => Some(Self::Ranked),
            Self::Ranked => Some(Self::Analyzed),
            Self::Analyzed => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and validates stage transitions for one run
#[derive(Debug)]
pub struct PipelineTracker {
    stage: PipelineStage,
    started: Instant,
}

impl Default for PipelineTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineTracker {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Received,
            started: Instant::now(),
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Move to `next`, which must be the direct successor of the current stage
    pub fn advance(&mut self, next: PipelineStage) -> Result<(), AnalysisError> {
        if self.stage.next() != Some(next) {
            return Err(AnalysisError::internal(format!(
                "Invalid pipeline transition from {} to {}",
                self.stage, next
            )));
        }

        debug!(
            from = %self.stage,
            to = %next,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Pipeline stage transition"
        );
        self.stage = next;
        Ok(())
    }

    /// Mark the run as failed. No-op once terminal.
    pub fn fail(&mut self, error: &AnalysisError) {
        if self.stage.is_terminal() {
            return;
        }

        warn!(
            stage = %self.stage,
            code = error.code(),
            error = %error,
            "Pipeline failed"
        );
        self.stage = PipelineStage::Failed;
    }
}
