use super::transcript::Transcript;
use super::InferenceError;
use crate::models::{Comment, Document, Fact, TickTieReport};
use crate::pipeline::tick_tie::grouping;

/// What the Extract operation reads from.
#[derive(Debug, Clone, Copy)]
pub enum ExtractionSource<'a> {
    /// Annotations embedded in the document itself; email excluded.
    DocumentTags { document: &'a Document },
    /// The reviewer email alone.
    Email { email_text: &'a str },
}

/// The semantic-inference capability behind the review pipeline.
///
/// Every extraction, classification, and judgment step is one operation on
/// this trait, so the state machine and the grouping/tolerance logic are
/// testable against a deterministic stub. Implementations append each
/// exchange to the caller-owned per-track transcript; subsequent operations
/// receive the accumulated history.
pub trait ReviewInference: Send + Sync {
    /// Does the document carry embedded reviewer annotations?
    fn detect(
        &self,
        transcript: &mut Transcript,
        document: &Document,
    ) -> Result<bool, InferenceError>;

    /// Extract candidate comments from one source.
    fn extract(
        &self,
        transcript: &mut Transcript,
        source: ExtractionSource<'_>,
    ) -> Result<Vec<Comment>, InferenceError>;

    /// Re-scan the document for actionable items not covered by `existing`.
    fn rescan(
        &self,
        transcript: &mut Transcript,
        document: &Document,
        existing: &[Comment],
    ) -> Result<Vec<Comment>, InferenceError>;

    /// Merge candidates into one canonical list: dedup by underlying
    /// requested change, split bundled comments into atomic ones. The
    /// splitting policy lives here, swappable with the implementation.
    fn compile(
        &self,
        transcript: &mut Transcript,
        candidates: &[Comment],
    ) -> Result<Vec<Comment>, InferenceError>;

    /// Classify each compiled comment against the original/revised pair.
    fn evaluate(
        &self,
        transcript: &mut Transcript,
        compiled: &[Comment],
        original: &Document,
        revised: &Document,
    ) -> Result<Vec<Comment>, InferenceError>;

    /// Extract numeric facts from the revised deck, using the email as a
    /// hint of which metrics matter.
    fn extract_facts(
        &self,
        transcript: &mut Transcript,
        revised: &Document,
        email_text: &str,
    ) -> Result<Vec<Fact>, InferenceError>;

    /// Classify metric groups as consistent or inconsistent.
    ///
    /// Tolerance comparison is arithmetic, so the default delegates to the
    /// deterministic grouping engine; override to swap in a different
    /// comparison policy.
    fn compare(&self, facts: &[Fact], tolerance: f64) -> Result<TickTieReport, InferenceError> {
        Ok(grouping::compare_facts(facts, tolerance))
    }
}
