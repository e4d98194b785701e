pub mod file_store;
pub mod upload_service;

pub use file_store::*;
pub use upload_service::*;
