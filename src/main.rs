use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docchat_upload::config::Settings;
use docchat_upload::routes::create_app;
use docchat_upload::services::{LocalFileStore, UploadService};
use docchat_upload::state::AppState;
use docchat_upload::utils::{shutdown_signal, ShutdownCoordinator};

/// Upper bound on waiting for in-flight uploads during shutdown.
const UPLOAD_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "docchat_upload=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration ({}), using defaults", e);
        Settings::default()
    });

    tracing::info!("Starting upload server...");
    tracing::info!("Configuration: {:?}", settings);

    let store = Arc::new(LocalFileStore::new(&settings.upload.content_dir));
    tokio::fs::create_dir_all(store.root()).await?;
    tracing::info!("Content directory: {}", store.root().display());

    let upload_service = Arc::new(UploadService::new(
        store,
        settings.upload.policy(),
        settings.upload.public_path.clone(),
    ));
    let shutdown_coordinator = ShutdownCoordinator::new();
    let app_state = AppState::new(upload_service, shutdown_coordinator.clone());

    let app = create_app(app_state, &settings);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    let shutdown_future = async move {
        shutdown_signal().await;
        shutdown_coordinator
            .start_graceful_shutdown(UPLOAD_DRAIN_TIMEOUT)
            .await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_future)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
