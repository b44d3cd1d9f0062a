pub mod api;
pub mod config;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod report;

pub use config::ServiceConfig;
pub use inference::{LlmCapability, OpenAiClient, ReviewInference};
pub use models::{Comment, CommentStatus, Document, Fact, Page, ReviewReport, TickTieReport};
pub use pipeline::{run_review, ReviewRequest};
