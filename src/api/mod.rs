//! HTTP surface: a composable axum router plus server lifecycle.
//!
//! The review pipeline itself is transport-agnostic; these handlers adapt
//! JSON requests onto the orchestrator and render the summary. File-format
//! conversion and inbox polling live outside this service — callers send
//! pre-adapted documents.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{api_router, ApiContext};
pub use server::serve;
