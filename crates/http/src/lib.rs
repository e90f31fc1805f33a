//! HTTP server facade for bookshelf: router assembly, error pages, cookies and flash messages.

use anyhow::Context;
use axum::{routing::get, Router};

use bookshelf_kernel::{AppState, ModuleRegistry};

pub mod cookies;
pub mod error;
pub mod flash;
pub mod html;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server with the given module registry
///
/// Returns once a shutdown signal (Ctrl+C) has been received and in-flight
/// requests have drained.
pub async fn start_server(registry: &ModuleRegistry, state: AppState) -> anyhow::Result<()> {
    let address = format!("{}:{}", state.settings.server.host, state.settings.server.port);
    tracing::info!("starting HTTP server on {}", address);

    let app = build_router(registry, state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {}", address))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, state: AppState) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        tracing::info!(module = module.name(), "mounting module routes");
        router_builder = router_builder.mount_module(module.routes());
    }

    router_builder
        .with_not_found()
        .with_tracing()
        .with_request_id()
        .with_timeout(state.settings.server.request_timeout_ms)
        .build(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
