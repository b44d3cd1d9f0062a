pub mod comments;
pub mod compile;
pub mod orchestrator;
pub mod tick_tie;

pub use comments::CommentPipeline;
pub use orchestrator::{run_review, ReviewRequest};
pub use tick_tie::TickTieEngine;

use thiserror::Error;

use crate::inference::{InferenceError, Stage};

/// A review track aborted at a specific stage.
///
/// Stage failures are fatal for their track only: no partial comment or
/// fact list is emitted, and the other tracks are unaffected.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct TrackError {
    pub stage: Stage,
    #[source]
    pub source: InferenceError,
}

impl TrackError {
    pub fn new(stage: Stage, source: InferenceError) -> Self {
        Self { stage, source }
    }
}
