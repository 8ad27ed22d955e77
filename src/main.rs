//! `registryd`: the artifact registry's binary entry point.
//!
//! Thin composition layer — it loads configuration, wires the
//! configured backends into an [`ArtifactAccessor`], and either serves the
//! HTTP API, bootstraps backend schemas, or runs a standalone deferred
//! ingest worker process.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use artifact_registry::accessor::{AccessorConfig, ArtifactAccessor};
use artifact_registry::api::{build_router, AppState};
use artifact_registry::audit::{self, AuditLog, NullAuditLog};
use artifact_registry::cache;
use artifact_registry::config::RegistryConfig;
use artifact_registry::health::NoopHealthSink;
use artifact_registry::ingest::DeferredIngestManager;
use artifact_registry::objectstore;
use artifact_registry::storage;

#[derive(Parser)]
#[command(name = "registryd", version, about = "Content-addressed artifact registry for ML models, datasets, and codebases")]
struct Cli {
    /// Optional TOML file overriding defaults; the process environment
    /// always wins over both.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve,
    /// Connect to the configured metadata store and audit log just long
    /// enough to bootstrap their schema, then exit.
    Migrate,
    /// Run a standalone deferred-ingest worker pool with no HTTP server
    /// attached.
    Worker,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match RegistryConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    let result = match cli.command {
        Command::Serve => run_serve(config).await,
        Command::Migrate => run_migrate(&config).await,
        Command::Worker => run_worker(config).await,
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "registryd exited with an error");
        std::process::exit(1);
    }
}

fn init_tracing(config: &RegistryConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds every subsystem backend and wires them into one accessor. Shared
/// by all three subcommands so `serve`/`migrate`/`worker` never drift in
/// how they construct the core.
async fn build_accessor(config: &RegistryConfig) -> anyhow::Result<Arc<ArtifactAccessor>> {
    let storage_backend = storage::build(&config.storage).await?;
    let object_store = objectstore::build(&config.object_store).await?;
    let audit_log: Arc<dyn AuditLog> = if config.audit.enabled {
        audit::build(&config.audit, config.storage.postgres.as_ref()).await?
    } else {
        Arc::new(NullAuditLog)
    };
    let cache_backend = cache::build(&config.cache).await?;

    Ok(Arc::new(ArtifactAccessor::new(
        storage_backend,
        object_store,
        audit_log,
        cache_backend,
        config.rater.clone(),
        AccessorConfig::default(),
    )))
}

async fn run_serve(config: RegistryConfig) -> anyhow::Result<()> {
    let accessor = build_accessor(&config).await?;

    let deferred = if config.ingest.ingest_asynchronous {
        Some(Arc::new(DeferredIngestManager::start(
            accessor.clone(),
            config.ingest.clone(),
        )))
    } else {
        None
    };

    let state = AppState {
        accessor,
        ingest_config: config.ingest.clone(),
        deferred: deferred.clone(),
        health: Arc::new(NoopHealthSink),
    };

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.http.bind.as_str()).await?;
    tracing::info!(bind = %config.http.bind, "registryd listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(manager) = deferred {
        match Arc::try_unwrap(manager) {
            Ok(manager) => manager.shutdown().await,
            Err(_) => tracing::warn!("deferred ingest manager still has live references at shutdown"),
        }
    }

    Ok(())
}

async fn run_migrate(config: &RegistryConfig) -> anyhow::Result<()> {
    build_accessor(config).await?;
    tracing::info!("backend schema bootstrap complete");
    Ok(())
}

async fn run_worker(config: RegistryConfig) -> anyhow::Result<()> {
    let accessor = build_accessor(&config).await?;
    let manager = DeferredIngestManager::start(accessor, config.ingest.clone());
    tracing::info!(workers = config.ingest.workers, "standalone deferred ingest worker pool running");
    shutdown_signal().await;
    manager.shutdown().await;
    Ok(())
}

/// Cooperative shutdown trigger: SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
