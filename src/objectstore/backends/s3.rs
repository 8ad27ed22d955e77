//! S3-compatible object store backend.

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::model::ArtifactId;
use crate::objectstore::config::S3Config;
use crate::objectstore::error::{ObjectError, ObjectResult};
use crate::objectstore::traits::ObjectStore;

pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Backend {
    pub async fn connect(config: &S3Config) -> ObjectResult<Self> {
        let mut loader = aws_config::from_env().region(aws_sdk_s3::config::Region::new(
            config.region.clone(),
        ));
        if let Some(url) = &config.url {
            loader = loader.endpoint_url(url.clone());
        }
        let shared_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "artifact-registry",
            ))
            .force_path_style(config.url.is_some())
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
        })
    }

    fn key(&self, id: &ArtifactId) -> String {
        format!("{}/{}", self.prefix, id.as_str())
    }
}

#[async_trait]
impl ObjectStore for S3Backend {
    async fn upload(&self, id: &ArtifactId, bytes: Vec<u8>) -> ObjectResult<()> {
        let key = self.key(id);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ObjectError::Transient(e.to_string()))?;
        debug!(%key, "uploaded blob");
        Ok(())
    }

    async fn delete(&self, id: &ArtifactId) -> ObjectResult<()> {
        let key = self.key(id);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| ObjectError::Transient(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, id: &ArtifactId) -> ObjectResult<bool> {
        let key = self.key(id);
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    warn!(%key, error = %service_err, "head_object failed");
                    Err(ObjectError::Transient(service_err.to_string()))
                }
            }
        }
    }

    async fn presigned_get(&self, id: &ArtifactId, ttl: Duration) -> ObjectResult<String> {
        let key = self.key(id);
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| ObjectError::Configuration(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presigning)
            .await
            .map_err(|e| ObjectError::Transient(e.to_string()))?;
        Ok(request.uri().to_string())
    }
}
