//! snapsort-ic - Image Intent Classification microservice
//!
//! **Module Identity:**
//! - Name: snapsort-ic (Image Classification)
//! - Default port: 5730
//!
//! Accepts an uploaded image, asks a remote multimodal model why the user
//! saved it (Shopping, Document, Music, Other) and returns the label as JSON.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use snapsort_common::config::{default_config_path, load_toml_config, TomlConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapsort_ic::config::ServiceConfig;
use snapsort_ic::services::OpenAiClassifier;
use snapsort_ic::{AppState, MODULE_NAME};

/// Command-line arguments for snapsort-ic
#[derive(Parser, Debug)]
#[command(name = "snapsort-ic")]
#[command(about = "Image intent classification microservice for SnapSort")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1", env = "SNAPSORT_HOST")]
    host: std::net::IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "SNAPSORT_PORT")]
    port: u16,

    /// TOML config file (defaults to <config_dir>/snapsort/snapsort-ic.toml)
    #[arg(short, long, env = "SNAPSORT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so its log level can apply
    let config_path = args.config.clone().or_else(|| default_config_path(MODULE_NAME));
    let toml_config = match config_path.as_deref() {
        Some(path) if path.exists() => Some(
            load_toml_config(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
        ),
        _ => None,
    };

    let log_level = toml_config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|| snapsort_common::config::DEFAULT_LOG_LEVEL.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "snapsort_ic={level},snapsort_common={level},tower_http={level}",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} (Image Classification) microservice", MODULE_NAME);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Build: {} ({})", env!("GIT_HASH"), env!("BUILD_TIMESTAMP"));

    let toml_config = match (toml_config, config_path) {
        (Some(config), Some(path)) => {
            info!("Config file: {}", path.display());
            config
        }
        (_, path) => {
            warn!(
                "No config file found{}; using environment and defaults",
                path.map(|p| format!(" at {}", p.display())).unwrap_or_default()
            );
            TomlConfig::default()
        }
    };

    let service_config =
        ServiceConfig::resolve(&toml_config).context("Failed to resolve configuration")?;
    info!(
        base_url = %service_config.classifier.base_url,
        model = %service_config.classifier.model,
        max_retries = service_config.retry_policy.max_retries,
        retry_delay_ms = service_config.retry_policy.delay.as_millis() as u64,
        "Classifier configured"
    );

    let classifier = OpenAiClassifier::new(service_config.classifier)
        .context("Failed to build classifier client")?;

    let state = AppState::new(Arc::new(classifier), service_config.retry_policy)
        .with_max_upload_bytes(service_config.max_upload_bytes);

    let app = snapsort_ic::build_router(state);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Classify: POST http://{}/classify", addr);

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
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
