//! Object store configuration: `object_store.{url, access_key, secret_key,
//! bucket, prefix, region}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// S3-compatible store via `aws-sdk-s3` (production default).
    S3,
    /// Local filesystem directory, for tests and local development.
    File,
}

impl Default for BackendType {
    fn default() -> Self {
        Self::File
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Endpoint override; unset to use AWS's default resolver.
    #[serde(default)]
    pub url: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Data namespace every object key is prefixed with.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_prefix() -> String {
    "artifacts".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub root: std::path::PathBuf,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub backend: BackendType,
    pub s3: Option<S3Config>,
    pub file: Option<FileConfig>,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::File,
            s3: None,
            file: Some(FileConfig {
                root: std::env::temp_dir().join("artifact-registry-blobs"),
                prefix: default_prefix(),
            }),
        }
    }
}
