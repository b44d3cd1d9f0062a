//! Server lifecycle: bind → serve → graceful shutdown.

use std::net::SocketAddr;

use tracing::info;

use super::routes::{api_router, ApiContext};

/// Bind the API on `0.0.0.0:port` and serve until interrupted.
pub async fn serve(ctx: ApiContext, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "deckcheck API listening");

    axum::serve(listener, api_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
