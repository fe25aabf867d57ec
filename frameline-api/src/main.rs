//! Frameline API - Main entry point
//!
//! Review and payments backend for a video production studio: timeline
//! comments, notification fan-out, signed payment capture, and role
//! provisioning behind one HTTP surface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frameline_api::payments::HttpOrderGateway;
use frameline_api::{build_router, identity, triggers, AppContext};
use frameline_common::config;
use frameline_common::events::EventBus;

/// Command-line arguments for frameline-api
#[derive(Parser, Debug)]
#[command(name = "frameline-api")]
#[command(about = "Review and payments backend for Frameline")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5850", env = "FRAMELINE_PORT")]
    port: u16,

    /// Data folder holding the document store
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frameline_api=debug,frameline_common=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    info!("Starting Frameline API on port {}", args.port);

    let toml = config::load_toml_config();
    let data_dir = config::resolve_data_dir(args.data_dir.as_deref(), toml.as_ref());
    info!("Data folder: {}", data_dir.display());

    // A missing gateway secret aborts startup; signature checks never fail open
    let gateway_config =
        config::resolve_gateway_config(toml.as_ref()).context("Payment gateway configuration")?;
    let gateway_secret = gateway_config.secret.clone();

    let db = frameline_common::db::init_database(&config::database_path(&data_dir))
        .await
        .context("Failed to initialize document store")?;
    info!("Document store initialized");

    let bus = EventBus::new(1000);
    let ctx = AppContext::new(
        db,
        bus,
        Arc::new(HttpOrderGateway::new(gateway_config)),
        gateway_secret,
    );

    // Read-repair any role drift left over from a partial provisioning run
    let repaired = identity::reconcile_roles(&ctx.directory, &ctx.db)
        .await
        .context("Role reconciliation failed")?;
    if repaired > 0 {
        info!("Reconciled {} drifted role claim(s)", repaired);
    }

    // Trigger workers consume the change feed for the life of the process
    let _workers = triggers::spawn(&ctx);

    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
