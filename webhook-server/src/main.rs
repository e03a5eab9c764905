//! WABA Webhook server.
//!
//! Receives WhatsApp Business Cloud API callbacks, verifies them and logs the
//! extracted events as structured JSON.

use std::future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use waba_webhook::{build_router, AppState, Config, TracingSink};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env();
    info!(
        port = config.port,
        signature_verification = config.signature_verification_enabled(),
        "config_loaded"
    );
    if !config.signature_verification_enabled() {
        warn!("app_secret_unset_accepting_unsigned_deliveries");
    }

    serve(config).await
}

/// JSON logs filtered by `RUST_LOG`, `info` when unset.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();
}

async fn serve(config: Config) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let router = build_router(AppState::new(config, Arc::new(TracingSink)));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(address = %addr, "webhook_server_listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_requested())
        .await
        .context("serving webhook requests")?;

    info!("webhook_server_stopped");
    Ok(())
}

/// Resolves on SIGINT or, on unix, SIGTERM. A handler that cannot be
/// installed is logged and never fires.
async fn shutdown_requested() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "sigint_handler_unavailable");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "sigterm_handler_unavailable");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    let signal_name = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!(signal = signal_name, "webhook_server_draining");
}
