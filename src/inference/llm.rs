use tracing::debug;

use super::capability::{ExtractionSource, ReviewInference};
use super::client::{CompletionClient, CompletionRequest, ModelTier};
use super::parser::{self, CommentsResponse, DetectResponse, FactsResponse};
use super::transcript::{TraceContext, Transcript};
use super::{prompts, InferenceError, Stage};
use crate::models::{Comment, Document, Fact};

/// `ReviewInference` backed by a raw completion client.
///
/// Each operation builds the stage instructions and context, issues one
/// blocking call with the track's prior exchanges, and validates the
/// response against the stage schema. Only schema-valid exchanges are
/// recorded on the transcript. Failures are never retried — they surface to
/// the controller, which aborts the track.
pub struct LlmCapability<C: CompletionClient> {
    client: C,
    trace: Option<TraceContext>,
}

impl<C: CompletionClient> LlmCapability<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: TraceContext) -> Self {
        self.trace = Some(trace);
        self
    }

    fn call(
        &self,
        transcript: &Transcript,
        stage: Stage,
        tier: ModelTier,
        instructions: &str,
        input: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, InferenceError> {
        let request = CompletionRequest {
            stage,
            tier,
            instructions,
            input,
            prior: transcript.exchanges(),
            max_tokens,
            temperature,
            trace: self.trace.as_ref(),
        };
        let output = self.client.complete(&request)?;
        debug!(stage = %stage, prior = transcript.len(), "inference stage completed");
        Ok(output)
    }
}

impl<C: CompletionClient> ReviewInference for LlmCapability<C> {
    fn detect(
        &self,
        transcript: &mut Transcript,
        document: &Document,
    ) -> Result<bool, InferenceError> {
        let input = prompts::document_input(document);
        let output = self.call(
            transcript,
            Stage::Detect,
            ModelTier::Light,
            prompts::DETECT_INSTRUCTIONS,
            &input,
            1024,
            0.1,
        )?;
        let parsed: DetectResponse = parser::parse_stage(&output)?;
        transcript.record(Stage::Detect, input, output);
        Ok(parsed.has_internal_comments)
    }

    fn extract(
        &self,
        transcript: &mut Transcript,
        source: ExtractionSource<'_>,
    ) -> Result<Vec<Comment>, InferenceError> {
        let (instructions, input, tier, max_tokens, temperature) = match source {
            ExtractionSource::DocumentTags { document } => (
                prompts::EXTRACT_TAGS_INSTRUCTIONS,
                prompts::document_input(document),
                ModelTier::Standard,
                4096,
                0.2,
            ),
            ExtractionSource::Email { email_text } => (
                prompts::EXTRACT_EMAIL_INSTRUCTIONS,
                prompts::email_input(email_text),
                ModelTier::Light,
                2048,
                0.1,
            ),
        };
        let output = self.call(
            transcript,
            Stage::Extract,
            tier,
            instructions,
            &input,
            max_tokens,
            temperature,
        )?;
        let parsed: CommentsResponse = parser::parse_stage(&output)?;
        transcript.record(Stage::Extract, input, output);
        Ok(parser::candidates_from(parsed))
    }

    fn rescan(
        &self,
        transcript: &mut Transcript,
        document: &Document,
        existing: &[Comment],
    ) -> Result<Vec<Comment>, InferenceError> {
        let input = prompts::rescan_input(document, existing);
        let output = self.call(
            transcript,
            Stage::Rescan,
            ModelTier::Light,
            prompts::RESCAN_INSTRUCTIONS,
            &input,
            4096,
            0.1,
        )?;
        let parsed: CommentsResponse = parser::parse_stage(&output)?;
        transcript.record(Stage::Rescan, input, output);
        Ok(parser::candidates_from(parsed))
    }

    fn compile(
        &self,
        transcript: &mut Transcript,
        candidates: &[Comment],
    ) -> Result<Vec<Comment>, InferenceError> {
        let input = prompts::compile_input(candidates);
        let output = self.call(
            transcript,
            Stage::Compile,
            ModelTier::Light,
            prompts::COMPILE_INSTRUCTIONS,
            &input,
            4096,
            0.2,
        )?;
        let parsed: CommentsResponse = parser::parse_stage(&output)?;
        transcript.record(Stage::Compile, input, output);
        Ok(parser::candidates_from(parsed))
    }

    fn evaluate(
        &self,
        transcript: &mut Transcript,
        compiled: &[Comment],
        original: &Document,
        revised: &Document,
    ) -> Result<Vec<Comment>, InferenceError> {
        let input = prompts::evaluate_input(compiled, original, revised);
        let output = self.call(
            transcript,
            Stage::Evaluate,
            ModelTier::Standard,
            prompts::EVALUATE_INSTRUCTIONS,
            &input,
            4096,
            0.2,
        )?;
        let parsed: CommentsResponse = parser::parse_stage(&output)?;
        let evaluated = parser::evaluated_from(parsed)?;
        transcript.record(Stage::Evaluate, input, output);
        Ok(evaluated)
    }

    fn extract_facts(
        &self,
        transcript: &mut Transcript,
        revised: &Document,
        email_text: &str,
    ) -> Result<Vec<Fact>, InferenceError> {
        let input = prompts::facts_input(revised, email_text);
        let output = self.call(
            transcript,
            Stage::ExtractFacts,
            ModelTier::Standard,
            prompts::EXTRACT_FACTS_INSTRUCTIONS,
            &input,
            4096,
            1.0,
        )?;
        let parsed: FactsResponse = parser::parse_stage(&output)?;
        transcript.record(Stage::ExtractFacts, input, output);
        Ok(parser::facts_from(parsed))
    }
}
