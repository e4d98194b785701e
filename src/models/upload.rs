use serde::{Deserialize, Serialize};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const PDF_EXTENSION: &str = ".pdf";

/// Multipart field carrying the uploaded parts.
pub const FILES_FIELD: &str = "files";

/// Acknowledgment record for a persisted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Name as declared by the sender, not sanitized.
    pub name: String,
    pub size: u64,
    /// Public, root-relative path of the stored file.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub files: Vec<StoredFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Count and size limits applied to an upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_files: usize,
    pub max_file_size: u64,
}

impl UploadPolicy {
    /// Ceiling in whole megabytes, as shown in error messages.
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size / (1024 * 1024)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: 5,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}
