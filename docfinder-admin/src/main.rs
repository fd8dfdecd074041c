//! docfinder-admin - Doctor directory administration service
//!
//! Serves the admin UI and JSON API on top of the SQLite record store,
//! SQLite identity service and local blob folder.

use anyhow::{Context, Result};
use clap::Parser;
use docfinder_common::blob::FsBlobStore;
use docfinder_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use docfinder_common::db::init_database;
use docfinder_common::identity::{IdentityClient, SessionEvent, SqliteIdentity};
use docfinder_common::store::SqliteRecordStore;
use docfinder_admin::bootstrap::{ensure_admin_user, initialize_database};
use docfinder_admin::{build_router, AppState, BLOB_URL_PREFIX};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for docfinder-admin
#[derive(Parser, Debug)]
#[command(name = "docfinder-admin")]
#[command(about = "Doctor directory administration service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides docfinder.toml)
    #[arg(short, long, env = "DOCFINDER_PORT")]
    port: Option<u16>,

    /// Root folder holding the database, photos and docfinder.toml
    #[arg(short, long, env = "DOCFINDER_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind (overrides docfinder.toml)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read before tracing starts: it supplies the default log level
    let root_folder = RootFolderResolver::new(args.root_folder.clone()).resolve();
    let config = TomlConfig::load(&root_folder);
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "docfinder_admin={level},docfinder_common={level},tower_http={level}",
                    level = level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting Doctor Finder Admin (docfinder-admin) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = config.context("Failed to load configuration")?;
    info!("Log level: {}", level);

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let store = Arc::new(
        SqliteRecordStore::open(pool.clone())
            .await
            .context("Failed to open record store")?,
    );
    let identity = Arc::new(SqliteIdentity::new(
        pool,
        Duration::from_secs(config.session_timeout_secs),
    ));
    let blob_dir = initializer.blob_path();
    let blobs = Arc::new(FsBlobStore::new(blob_dir.clone(), BLOB_URL_PREFIX));

    ensure_admin_user(&identity, &config.admin).await;
    initialize_database(store.as_ref()).await;
    spawn_session_logger(identity.as_ref());

    let state = AppState::new(
        store,
        identity,
        blobs,
        blob_dir,
        config.session_timeout_secs,
    );
    let app = build_router(state);

    let bind = args.bind.unwrap_or(config.bind);
    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("docfinder-admin listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Log every sign-in and sign-out
fn spawn_session_logger(identity: &dyn IdentityClient) {
    let mut events = identity.watch_sessions();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SignedIn { email }) => info!("User signed in: {}", email),
                Ok(SessionEvent::SignedOut { email }) => info!("User signed out: {}", email),
                Err(RecvError::Lagged(n)) => warn!("Session log skipped {} events", n),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
