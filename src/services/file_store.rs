use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::utils::storage_name;

/// How many fresh names are tried before giving up on a create.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Write-once storage for uploaded files.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` under a new name derived from `declared_name`.
    /// Never overwrites an existing file. Returns the storage name.
    async fn create(&self, declared_name: &str, bytes: &[u8]) -> io::Result<String>;

    /// Remove a file previously returned by `create`.
    async fn remove(&self, storage_name: &str) -> io::Result<()>;
}

/// Flat content directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_new(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %cleanup, "failed to remove partial file");
            }
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn create(&self, declared_name: &str, bytes: &[u8]) -> io::Result<String> {
        fs::create_dir_all(&self.root).await?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = storage_name(declared_name);
            let path = self.root.join(&name);
            match self.write_new(&path, bytes).await {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), size = bytes.len(), "stored file");
                    return Ok(name);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::warn!(name = %name, "storage name already taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free storage name after {} attempts", MAX_NAME_ATTEMPTS),
        ))
    }

    async fn remove(&self, storage_name: &str) -> io::Result<()> {
        fs::remove_file(self.root.join(storage_name)).await
    }
}
