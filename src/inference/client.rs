use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::transcript::{Exchange, TraceContext};
use super::{InferenceError, Stage};
use crate::config::ServiceConfig;

/// Which model class a stage runs on. Detection, rescan, and compilation use
/// the light tier; extraction and evaluation the standard one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Standard,
    Light,
}

/// A single blocking completion request for one pipeline stage.
#[derive(Debug)]
pub struct CompletionRequest<'a> {
    pub stage: Stage,
    pub tier: ModelTier,
    /// Task instructions, sent as the system message.
    pub instructions: &'a str,
    /// Structured context payload for this stage, sent as the final user turn.
    pub input: &'a str,
    /// Accumulated prior exchanges of the track, oldest first.
    pub prior: &'a [Exchange],
    pub max_tokens: u32,
    pub temperature: f32,
    pub trace: Option<&'a TraceContext>,
}

/// Raw completion transport (allows mocking).
pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, InferenceError>;
}

/// Blocking client for an OpenAI-compatible chat completions backend.
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    standard_model: String,
    light_model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiClient {
    pub fn new(config: &ServiceConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.inference_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            standard_model: config.standard_model.clone(),
            light_model: config.light_model.clone(),
            client,
            timeout_secs: config.request_timeout_secs,
        }
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Standard => &self.standard_model,
            ModelTier::Light => &self.light_model,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, InferenceError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(request.prior.len() * 2 + 2);
        messages.push(ChatMessage {
            role: "system",
            content: request.instructions,
        });
        for exchange in request.prior {
            messages.push(ChatMessage {
                role: "user",
                content: &exchange.input,
            });
            messages.push(ChatMessage {
                role: "assistant",
                content: &exchange.output,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.input,
        });

        let body = ChatCompletionRequest {
            model: self.model_for(request.tier),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(trace) = request.trace {
            builder = builder.header("x-workflow-id", &trace.workflow_id);
            if let Some(source) = &trace.source {
                builder = builder.header("x-trace-source", source);
            }
        }

        let response = builder.send().map_err(|e| {
            if e.is_connect() {
                InferenceError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                InferenceError::Timeout(self.timeout_secs)
            } else {
                InferenceError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| InferenceError::MalformedCompletion(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(InferenceError::EmptyCompletion)?;

        if let Some(refusal) = choice.message.refusal {
            return Err(InferenceError::Refused(refusal));
        }

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(InferenceError::EmptyCompletion),
        }
    }
}

/// Mock completion client for testing — plays back a scripted sequence of
/// responses and counts calls.
pub struct MockCompletionClient {
    responses: Mutex<VecDeque<Result<String, InferenceError>>>,
    calls: AtomicUsize,
}

impl MockCompletionClient {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_results(responses: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("mock responses lock")
            .pop_front()
            .unwrap_or(Err(InferenceError::EmptyCompletion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(prior: &'a [Exchange]) -> CompletionRequest<'a> {
        CompletionRequest {
            stage: Stage::Detect,
            tier: ModelTier::Light,
            instructions: "instructions",
            input: "input",
            prior,
            max_tokens: 1024,
            temperature: 0.1,
            trace: None,
        }
    }

    #[test]
    fn mock_plays_back_in_order() {
        let client = MockCompletionClient::new(vec!["first", "second"]);
        assert_eq!(client.complete(&request(&[])).unwrap(), "first");
        assert_eq!(client.complete(&request(&[])).unwrap(), "second");
        assert_eq!(client.calls(), 2);
    }

    #[test]
    fn mock_exhausted_returns_empty_completion() {
        let client = MockCompletionClient::new(vec![]);
        assert!(matches!(
            client.complete(&request(&[])),
            Err(InferenceError::EmptyCompletion)
        ));
    }

    #[test]
    fn mock_scripted_failure_surfaces() {
        let client = MockCompletionClient::with_results(vec![Err(InferenceError::Timeout(300))]);
        assert!(matches!(
            client.complete(&request(&[])),
            Err(InferenceError::Timeout(300))
        ));
    }

    #[test]
    fn openai_client_trims_trailing_slash() {
        let cfg = ServiceConfig {
            inference_base_url: "http://localhost:8080/v1/".into(),
            ..ServiceConfig::default()
        };
        let client = OpenAiClient::new(&cfg);
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn tier_selects_model() {
        let cfg = ServiceConfig::default();
        let client = OpenAiClient::new(&cfg);
        assert_eq!(client.model_for(ModelTier::Standard), "gpt-4.1");
        assert_eq!(client.model_for(ModelTier::Light), "gpt-4.1-mini");
    }
}
