pub mod capability;
pub mod client;
pub mod llm;
pub mod parser;
pub mod prompts;
pub mod transcript;

pub use capability::{ExtractionSource, ReviewInference};
pub use client::{CompletionClient, CompletionRequest, MockCompletionClient, ModelTier, OpenAiClient};
pub use llm::LlmCapability;
pub use transcript::{Exchange, TraceContext, Transcript};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The stages of a review run, matching the capability operations one to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Detect,
    Extract,
    Rescan,
    Compile,
    Evaluate,
    ExtractFacts,
    Compare,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Extract => "extract",
            Self::Rescan => "rescan",
            Self::Compile => "compile",
            Self::Evaluate => "evaluate",
            Self::ExtractFacts => "extract_facts",
            Self::Compare => "compare",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures from the inference backend or its response handling.
///
/// None of these are retried: a stage that fails aborts its track.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference backend unreachable at {0}")]
    Connection(String),

    #[error("inference backend returned status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("inference request timed out after {0}s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("inference backend refused the request: {0}")]
    Refused(String),

    #[error("empty completion from inference backend")]
    EmptyCompletion,

    #[error("malformed completion: {0}")]
    MalformedCompletion(String),

    #[error("schema validation failed: {0}")]
    SchemaValidation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_match_capability_operations() {
        let all = [
            Stage::Detect,
            Stage::Extract,
            Stage::Rescan,
            Stage::Compile,
            Stage::Evaluate,
            Stage::ExtractFacts,
            Stage::Compare,
        ];
        let names: Vec<&str> = all.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "detect",
                "extract",
                "rescan",
                "compile",
                "evaluate",
                "extract_facts",
                "compare"
            ]
        );
    }

    #[test]
    fn errors_render_with_context() {
        let e = InferenceError::Backend {
            status: 429,
            body: "rate limited".into(),
        };
        assert!(e.to_string().contains("429"));
        let e = InferenceError::Timeout(300);
        assert!(e.to_string().contains("300"));
    }
}
