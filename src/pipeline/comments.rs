//! The comment pipeline controller: a per-run state machine over the
//! inference capability.
//!
//! Document-annotation track:
//! Detect → PrimaryExtract → SecondPassScan → Compile → Evaluate, with
//! Detect as the only branch point. Email track: Extract → Compile →
//! Evaluate. Stages are strictly sequential within a track — each call
//! builds on the accumulated transcript of everything before it.

use tracing::{debug, info_span};

use super::compile;
use super::TrackError;
use crate::inference::{ExtractionSource, ReviewInference, Stage, Transcript};
use crate::models::{Comment, Document};

pub struct CommentPipeline<'a, I: ReviewInference + ?Sized> {
    inference: &'a I,
}

impl<'a, I: ReviewInference + ?Sized> CommentPipeline<'a, I> {
    pub fn new(inference: &'a I) -> Self {
        Self { inference }
    }

    /// Run the document-annotation track: comments embedded in the original
    /// deck, evaluated against the revised one.
    pub fn run_tag_track(
        &self,
        original: &Document,
        revised: &Document,
    ) -> Result<Vec<Comment>, TrackError> {
        let _span = info_span!("tag_track", pages = original.page_count()).entered();

        if original.is_empty() {
            return Ok(Vec::new());
        }

        let mut transcript = Transcript::new();

        let detected = self
            .inference
            .detect(&mut transcript, original)
            .map_err(|e| TrackError::new(Stage::Detect, e))?;

        let candidates = if detected {
            let primary = self
                .inference
                .extract(
                    &mut transcript,
                    ExtractionSource::DocumentTags { document: original },
                )
                .map_err(|e| TrackError::new(Stage::Extract, e))?;

            let secondary = self
                .inference
                .rescan(&mut transcript, original, &primary)
                .map_err(|e| TrackError::new(Stage::Rescan, e))?;

            debug!(
                primary = primary.len(),
                secondary = secondary.len(),
                "document annotations extracted"
            );

            let mut candidates = primary;
            candidates.extend(secondary);
            candidates
        } else {
            Vec::new()
        };

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        self.compile_and_evaluate(&mut transcript, candidates, original, revised)
    }

    /// Run the email track: comments from the reviewer email, evaluated
    /// against the original/revised pair. The result stays separate from the
    /// document-annotation list end to end.
    pub fn run_email_track(
        &self,
        email_text: &str,
        original: &Document,
        revised: &Document,
    ) -> Result<Vec<Comment>, TrackError> {
        let _span = info_span!("email_track").entered();

        if email_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut transcript = Transcript::new();

        let candidates = self
            .inference
            .extract(&mut transcript, ExtractionSource::Email { email_text })
            .map_err(|e| TrackError::new(Stage::Extract, e))?;

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        self.compile_and_evaluate(&mut transcript, candidates, original, revised)
    }

    /// Shared tail of both tracks: compile candidates into the canonical
    /// list, renumber deterministically, then evaluate.
    fn compile_and_evaluate(
        &self,
        transcript: &mut Transcript,
        candidates: Vec<Comment>,
        original: &Document,
        revised: &Document,
    ) -> Result<Vec<Comment>, TrackError> {
        let compiled = self
            .inference
            .compile(transcript, &candidates)
            .map_err(|e| TrackError::new(Stage::Compile, e))?;

        // IDs come from the controller, never the backend.
        let compiled = compile::renumber(compiled);
        debug!(
            candidates = candidates.len(),
            compiled = compiled.len(),
            "comments compiled"
        );

        if compiled.is_empty() {
            return Ok(Vec::new());
        }

        let evaluated = self
            .inference
            .evaluate(transcript, &compiled, original, revised)
            .map_err(|e| TrackError::new(Stage::Evaluate, e))?;

        compile::validate_evaluated(&compiled, evaluated)
            .map_err(|e| TrackError::new(Stage::Evaluate, e))
    }
}
