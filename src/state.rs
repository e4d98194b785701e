use crate::services::UploadService;
use crate::utils::ShutdownCoordinator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
    pub shutdown_coordinator: ShutdownCoordinator,
}

impl AppState {
    pub fn new(
        upload_service: Arc<UploadService>,
        shutdown_coordinator: ShutdownCoordinator,
    ) -> Self {
        Self {
            upload_service,
            shutdown_coordinator,
        }
    }
}
