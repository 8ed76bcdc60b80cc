//! # TooHot Storefront API
//!
//! ```text
//! storefront-api [--config <path>]
//!
//!   config (toml + env) ──► SQLite (migrations) ──► Stripe gateway ──► axum
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use toohot_db::{Database, DbConfig};
use toohot_payments::{PaymentGateway, StripeGateway};
use toohot_storefront_api::{build_router, AppState, StorefrontConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting TooHot storefront API...");

    let config = StorefrontConfig::load(config_arg()).context("Failed to load configuration")?;
    info!(
        environment = ?config.environment,
        port = config.port,
        database = %config.database_path().display(),
        tax_rate_bps = config.tax_rate_bps,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(config.database_path()))
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    let gateway: Option<Arc<dyn PaymentGateway>> =
        match config.stripe_config().map(StripeGateway::new) {
            Ok(Ok(gateway)) => Some(Arc::new(gateway)),
            Ok(Err(e)) => {
                warn!(error = %e, "Payment gateway unavailable, payment routes will fail");
                None
            }
            Err(e) => {
                warn!(error = %e, "Payment gateway not configured, payment routes will fail");
                None
            }
        };

    let addr = config.bind_socket();
    let state = Arc::new(AppState::new(db, gateway, config));
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,toohot=debug,toohot_storefront_api=debug,sqlx=warn")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_target(true)
        .init();
}

/// `--config <path>` from the command line, if given.
fn config_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
