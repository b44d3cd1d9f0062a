use std::env;

/// Application-level constants
pub const APP_NAME: &str = "deckcheck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default absolute tolerance for tick-and-tie value comparison.
/// 0.0005 is 5 basis points for percentage metrics.
pub const DEFAULT_TOLERANCE: f64 = 0.0005;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info,tower_http=warn")
}

/// Service configuration, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`.
    pub inference_base_url: String,
    /// Bearer token for the inference backend. Optional for local backends.
    pub api_key: Option<String>,
    /// Model used for extraction and evaluation stages.
    pub standard_model: String,
    /// Cheaper model used for detection, rescan, and compilation stages.
    pub light_model: String,
    /// Per-request timeout for inference calls, in seconds.
    pub request_timeout_secs: u64,
    /// Tolerance applied when the caller does not supply one.
    pub default_tolerance: f64,
    /// HTTP bind port.
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            inference_base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            standard_model: "gpt-4.1".to_string(),
            light_model: "gpt-4.1-mini".to_string(),
            request_timeout_secs: 300,
            default_tolerance: DEFAULT_TOLERANCE,
            port: 8000,
        }
    }
}

impl ServiceConfig {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            inference_base_url: env::var("DECKCHECK_INFERENCE_URL")
                .unwrap_or(defaults.inference_base_url),
            api_key: env::var("DECKCHECK_API_KEY")
                .or_else(|_| env::var("OPENAI_API_KEY"))
                .ok(),
            standard_model: env::var("DECKCHECK_MODEL").unwrap_or(defaults.standard_model),
            light_model: env::var("DECKCHECK_MODEL_LIGHT").unwrap_or(defaults.light_model),
            request_timeout_secs: env::var("DECKCHECK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            default_tolerance: env::var("DECKCHECK_TOLERANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_tolerance),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}
