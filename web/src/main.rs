//! `slug-redirect`: serves `GET /{slug}` as a permanent redirect.
//!
//! Configuration comes from the environment (`SLUG_REDIRECT_ADDR`,
//! `SLUG_API_URL`, `SLUG_API_TIMEOUT_SECS`); logging honours `RUST_LOG`.

use anyhow::Context;
use slug_registry::RedirectResolver;
use slug_registry_client::HttpSlugApi;
use slug_registry_core::SlugApi;
use slug_registry_web::{app, AppState, ServerConfig};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slug_redirect=info,slug_registry=info,slug_registry_web=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    info!(addr = %config.addr, backend = %config.client.base_url, "Starting slug redirect server");

    let api: Arc<dyn SlugApi> =
        Arc::new(HttpSlugApi::new(&config.client).context("failed to build slug API client")?);
    let state = AppState::new(Arc::new(RedirectResolver::new(api)));

    let router = app(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!("Listening for requests");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(error) => {
                warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}
