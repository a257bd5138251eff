use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Filesystem stand-in for a bucket: keys become relative paths under `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        Path::new(&self.base_path).join(key)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let full_path = self.path_for(key);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                EtlError::publish_with(format!("Cannot create {}", parent.display()), e)
            })?;
        }

        // objects are immutable, refuse to replace an existing one
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
            .map_err(|e| EtlError::publish_with(format!("Cannot create {}", full_path.display()), e))?;

        file.write_all(&data)
            .await
            .map_err(|e| EtlError::publish_with(format!("Cannot write {}", full_path.display()), e))?;
        file.flush()
            .await
            .map_err(|e| EtlError::publish_with(format!("Cannot write {}", full_path.display()), e))?;

        tracing::debug!(
            "Wrote {} bytes ({}) to {}",
            data.len(),
            content_type,
            full_path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        format!("file://{}", self.base_path)
    }
}
