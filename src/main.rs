use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use deckcheck::api::{self, ApiContext};
use deckcheck::config::{self, ServiceConfig};
use deckcheck::inference::{LlmCapability, OpenAiClient, TraceContext};

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cfg = ServiceConfig::from_env();
    tracing::info!(
        version = config::APP_VERSION,
        backend = %cfg.inference_base_url,
        "deckcheck starting"
    );

    // The blocking inference client is built (and later dropped) outside the
    // async runtime; handlers only touch it from blocking tasks.
    let client = OpenAiClient::new(&cfg);
    let capability = LlmCapability::new(client).with_trace(TraceContext::new(config::APP_NAME));
    let ctx = ApiContext::new(Arc::new(capability), cfg.default_tolerance);

    tokio::runtime::Runtime::new()?.block_on(api::serve(ctx, cfg.port))
}
