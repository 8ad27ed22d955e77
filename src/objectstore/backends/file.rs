//! Local filesystem object store backend, used for tests and local
//! development (`backend = "file"`, the crate's default).

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

use crate::model::ArtifactId;
use crate::objectstore::config::FileConfig;
use crate::objectstore::error::{ObjectError, ObjectResult};
use crate::objectstore::traits::ObjectStore;

pub struct FileBackend {
    root: PathBuf,
    prefix: String,
}

impl FileBackend {
    pub async fn open(config: &FileConfig) -> ObjectResult<Self> {
        fs::create_dir_all(&config.root)
            .await
            .map_err(|e| ObjectError::Configuration(e.to_string()))?;
        Ok(Self {
            root: config.root.clone(),
            prefix: config.prefix.clone(),
        })
    }

    fn path(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(&self.prefix).join(id.as_str())
    }
}

#[async_trait]
impl ObjectStore for FileBackend {
    async fn upload(&self, id: &ArtifactId, bytes: Vec<u8>) -> ObjectResult<()> {
        let path = self.path(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ObjectError::Transient(e.to_string()))?;
        }
        fs::write(&path, bytes)
            .await
            .map_err(|e| ObjectError::Transient(e.to_string()))
    }

    async fn delete(&self, id: &ArtifactId) -> ObjectResult<()> {
        let path = self.path(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ObjectError::NotFound(id.to_string()))
            }
            Err(e) => Err(ObjectError::Transient(e.to_string())),
        }
    }

    async fn exists(&self, id: &ArtifactId) -> ObjectResult<bool> {
        Ok(fs::try_exists(self.path(id))
            .await
            .map_err(|e| ObjectError::Transient(e.to_string()))?)
    }

    /// No real presigning for a local directory; returns a `file://` URI
    /// that is valid for as long as the process runs the blob directory,
    /// ignoring `ttl`.
    async fn presigned_get(&self, id: &ArtifactId, _ttl: Duration) -> ObjectResult<String> {
        if !self.exists(id).await? {
            return Err(ObjectError::NotFound(id.to_string()));
        }
        Ok(format!("file://{}", self.path(id).display()))
    }

    async fn reset(&self) -> ObjectResult<()> {
        let namespace = self.root.join(&self.prefix);
        let _ = fs::remove_dir_all(&namespace).await;
        fs::create_dir_all(&namespace)
            .await
            .map_err(|e| ObjectError::Transient(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &tempfile::TempDir) -> FileConfig {
        FileConfig {
            root: dir.path().to_path_buf(),
            prefix: "artifacts".to_string(),
        }
    }

    #[tokio::test]
    async fn upload_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(&config(&dir)).await.unwrap();
        let id = ArtifactId::from_source_url("https://huggingface.co/bert");

        assert!(!backend.exists(&id).await.unwrap());
        backend.upload(&id, b"blob-bytes".to_vec()).await.unwrap();
        assert!(backend.exists(&id).await.unwrap());

        let url = backend.presigned_get(&id, Duration::from_secs(60)).await.unwrap();
        assert!(url.starts_with("file://"));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(&config(&dir)).await.unwrap();
        let id = ArtifactId::from_source_url("https://huggingface.co/never-uploaded");
        assert!(matches!(backend.delete(&id).await, Err(ObjectError::NotFound(_))));
    }
}
