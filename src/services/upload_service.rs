use bytes::{Bytes, BytesMut};
use std::sync::Arc;

use crate::error::UploadError;
use crate::models::{StoredFile, UploadPolicy};
use crate::services::FileStore;
use crate::utils::is_pdf;

/// One received part, buffered until the whole batch has been validated.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub name: String,
    pub content_type: Option<String>,
    /// Bytes received so far. Stops growing once the part is oversized.
    pub size: u64,
    data: BytesMut,
    oversized: bool,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            content_type,
            size: 0,
            data: BytesMut::new(),
            oversized: false,
        }
    }

    /// Convenience for a part whose bytes are already in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: Option<String>,
        bytes: &[u8],
        max_size: u64,
    ) -> Self {
        let mut staged = Self::new(name, content_type);
        staged.append(bytes, max_size);
        staged
    }

    /// Buffer a chunk. Once the running size passes `max_size` the data is
    /// dropped and the part is only remembered as oversized.
    pub fn append(&mut self, chunk: &[u8], max_size: u64) {
        if self.oversized {
            return;
        }
        self.size += chunk.len() as u64;
        if self.size > max_size {
            self.oversized = true;
            self.data = BytesMut::new();
        } else {
            self.data.extend_from_slice(chunk);
        }
    }

    pub fn is_oversized(&self) -> bool {
        self.oversized
    }

    pub fn bytes(&self) -> Bytes {
        self.data.clone().freeze()
    }
}

/// Validates and persists upload batches. A batch is stored completely or not at all.
pub struct UploadService {
    store: Arc<dyn FileStore>,
    policy: UploadPolicy,
    public_path: String,
}

impl UploadService {
    pub fn new(store: Arc<dyn FileStore>, policy: UploadPolicy, public_path: impl Into<String>) -> Self {
        Self {
            store,
            policy,
            public_path: public_path.into(),
        }
    }

    pub fn policy(&self) -> UploadPolicy {
        self.policy
    }

    /// Check a staged batch without touching storage.
    ///
    /// Order: empty batch, count, then type and size per part in receipt order.
    pub fn validate(&self, files: &[StagedFile]) -> Result<(), UploadError> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }
        if files.len() > self.policy.max_files {
            return Err(UploadError::TooManyFiles {
                max: self.policy.max_files,
            });
        }

        for file in files {
            if !is_pdf(file.content_type.as_deref(), &file.name) {
                return Err(UploadError::NotPdf {
                    name: file.name.clone(),
                });
            }
            if file.is_oversized() || file.size > self.policy.max_file_size {
                return Err(UploadError::TooLarge {
                    name: file.name.clone(),
                    limit_mb: self.policy.max_file_size_mb(),
                });
            }
        }

        Ok(())
    }

    /// Validate the whole batch, then write every part.
    pub async fn accept_batch(&self, files: Vec<StagedFile>) -> Result<Vec<StoredFile>, UploadError> {
        self.validate(&files)?;
        self.persist(files).await
    }

    async fn persist(&self, files: Vec<StagedFile>) -> Result<Vec<StoredFile>, UploadError> {
        let mut written: Vec<String> = Vec::with_capacity(files.len());
        let mut stored = Vec::with_capacity(files.len());

        for file in files {
            match self.store.create(&file.name, &file.data).await {
                Ok(storage_name) => {
                    stored.push(StoredFile {
                        name: file.name,
                        size: file.size,
                        path: self.public_path_for(&storage_name),
                    });
                    written.push(storage_name);
                }
                Err(e) => {
                    self.rollback(&written).await;
                    return Err(UploadError::Storage(e));
                }
            }
        }

        tracing::info!(count = stored.len(), "upload batch stored");
        Ok(stored)
    }

    async fn rollback(&self, written: &[String]) {
        for name in written {
            if let Err(e) = self.store.remove(name).await {
                tracing::error!(name = %name, error = %e, "failed to roll back stored file");
            }
        }
    }

    fn public_path_for(&self, storage_name: &str) -> String {
        format!("{}/{}", self.public_path.trim_end_matches('/'), storage_name)
    }
}
