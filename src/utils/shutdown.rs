use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{info, warn};

/// Tracks in-flight uploads so shutdown can wait for pending writes.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    /// Uploads currently being processed
    active_uploads: Arc<AtomicUsize>,
    /// Shutdown in progress flag
    shutdown_in_progress: Arc<AtomicBool>,
}

/// Held for the lifetime of one upload request.
pub struct UploadGuard {
    active_uploads: Arc<AtomicUsize>,
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        self.active_uploads.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            active_uploads: Arc::new(AtomicUsize::new(0)),
            shutdown_in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a new upload. Returns `None` once shutdown has started.
    pub fn begin_upload(&self) -> Option<UploadGuard> {
        // Increment before checking the flag
        self.active_uploads.fetch_add(1, Ordering::SeqCst);
        let guard = UploadGuard {
            active_uploads: self.active_uploads.clone(),
        };
        if self.is_shutdown_in_progress() {
            // Dropping the guard undoes the increment
            return None;
        }
        Some(guard)
    }

    pub fn active_uploads_count(&self) -> usize {
        self.active_uploads.load(Ordering::SeqCst)
    }

    pub fn is_shutdown_in_progress(&self) -> bool {
        self.shutdown_in_progress.load(Ordering::SeqCst)
    }

    /// Stop accepting uploads and wait for the active ones, up to `timeout_duration`.
    pub async fn start_graceful_shutdown(&self, timeout_duration: Duration) {
        info!("Starting graceful shutdown process");
        self.shutdown_in_progress.store(true, Ordering::SeqCst);

        let start_time = std::time::Instant::now();
        loop {
            let active = self.active_uploads_count();
            if active == 0 {
                info!("All uploads have completed");
                break;
            }

            if start_time.elapsed() >= timeout_duration {
                warn!(
                    "Graceful shutdown timeout reached. {} uploads still active",
                    active
                );
                break;
            }

            info!("Waiting for {} active uploads to finish...", active);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        info!("Graceful shutdown completed");
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
