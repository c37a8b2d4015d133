use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::Notify;
use tracing::{info, warn};

use mediadrop_server::api::AppState;
use mediadrop_server::config::MediadropConfig;

/// mediadrop media upload server.
#[derive(Parser, Debug)]
#[command(name = "mediadrop-server", about = "Standalone HTTP server for mediadrop")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "mediadrop.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run database migrations for the configured catalog backend, then exit.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = Path::new(&cli.config);
    let mut config = MediadropConfig::load(config_path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;

    if let Some(Commands::Migrate) = cli.command {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
        return run_migrate(&config).await;
    }

    // Tracing must be up before the backends log anything.
    let telemetry_guard = mediadrop_server::telemetry::init(&config.telemetry);

    if !config_path.exists() {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    let blobs = mediadrop_server::blob_factory::create_blob_store(&config.storage).await?;
    info!(backend = %config.storage.backend, kind = %blobs.backend(), "blob store initialized");

    let catalog = mediadrop_server::catalog_factory::create_catalog(&config.catalog).await?;
    info!(backend = catalog.name(), "media catalog initialized");

    if config.records_lost_on_restart() {
        warn!(
            storage = %config.storage.backend,
            "memory catalog with persistent storage: stored files outlive their records on restart \
             and are never expired"
        );
    }

    let reaper = if config.catalog.cleanup_interval_seconds > 0 {
        info!(
            ttl_secs = config.catalog.ttl_seconds,
            interval_secs = config.catalog.cleanup_interval_seconds,
            "media reaper started"
        );
        Some(mediadrop_catalog::spawn_reaper(
            Arc::clone(&catalog),
            Arc::clone(&blobs),
            Duration::from_secs(config.catalog.ttl_seconds),
            Duration::from_secs(config.catalog.cleanup_interval_seconds),
        ))
    } else {
        info!("media reaper disabled");
        None
    };

    let state = AppState::from_config(&config, blobs, catalog);
    let app = mediadrop_server::api::router(state);

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        address = %addr,
        mode = ?config.server.mode,
        upload_limit_mb = config.upload.max_file_size_mb,
        "mediadrop-server listening"
    );

    // Stop accepting on SIGINT / SIGTERM, then give in-flight requests
    // `shutdown_timeout_seconds` to drain.
    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let signalled = Arc::clone(&signalled);
        async move {
            shutdown_signal().await;
            signalled.notify_one();
        }
    })
    .into_future();

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    tokio::select! {
        result = server => result?,
        () = async {
            signalled.notified().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "shutdown timeout exceeded, dropping in-flight requests"
            );
        }
    }

    if let Some(handle) = reaper {
        handle.abort();
    }

    // Flush pending OpenTelemetry spans before exit.
    telemetry_guard.shutdown();

    info!("mediadrop-server shut down");
    Ok(())
}

/// Run the `migrate` subcommand: initialize the catalog schema and exit.
async fn run_migrate(config: &MediadropConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = %config.catalog.backend, "running catalog migrations...");
    let _catalog = mediadrop_server::catalog_factory::create_catalog(&config.catalog).await?;
    info!(backend = %config.catalog.backend, "catalog migrations complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
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
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
