use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;

use crate::models::{PDF_EXTENSION, PDF_MEDIA_TYPE};
use crate::utils::is_pdf;

/// A file offered to the picker but not yet submitted.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: Option<String>,
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        media_type: Option<String>,
        data: impl Into<Bytes>,
        last_modified: i64,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            media_type,
            size: data.len() as u64,
            last_modified,
            data,
        }
    }

    /// Load a file from disk, the way a file dialog hands one over.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                )
            })?;

        let metadata = tokio::fs::metadata(path).await?;
        let last_modified = metadata
            .modified()
            .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
            .unwrap_or_default();
        let data = tokio::fs::read(path).await?;

        let media_type = name
            .to_lowercase()
            .ends_with(PDF_EXTENSION)
            .then(|| PDF_MEDIA_TYPE.to_string());

        Ok(Self::new(name, media_type, data, last_modified))
    }

    pub fn is_pdf(&self) -> bool {
        is_pdf(self.media_type.as_deref(), &self.name)
    }

    /// Two candidates with the same key are the same file.
    pub fn same_file(&self, other: &CandidateFile) -> bool {
        self.name == other.name
            && self.size == other.size
            && self.last_modified == other.last_modified
    }
}

/// Human-readable size: bytes, then KB and MB with one decimal.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
