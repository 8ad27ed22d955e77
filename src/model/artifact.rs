//! Artifact identity and the common three-kind shape.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AccessError;

/// The artifact's category. Each kind is a distinct physical table in the
/// metadata store, but shares the same logical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Model,
    Dataset,
    Code,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Dataset => "dataset",
            Self::Code => "code",
        }
    }

    pub fn all() -> [Kind; 3] {
        [Kind::Model, Kind::Dataset, Kind::Code]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(Self::Model),
            "dataset" => Ok(Self::Dataset),
            "code" => Ok(Self::Code),
            other => Err(AccessError::bad_request(format!(
                "unknown artifact kind '{other}', expected model|dataset|code"
            ))),
        }
    }
}

/// A validated artifact id: 1..64 chars drawn from `[a-zA-Z0-9\-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, AccessError> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > 64 {
            return Err(AccessError::bad_request(format!(
                "artifact id must be 1..64 chars, got {} chars",
                raw.len()
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(AccessError::bad_request(
                "artifact id must match [a-zA-Z0-9-]+",
            ));
        }
        Ok(Self(raw))
    }

    /// Deterministically derive an id from a source URL.
    ///
    /// This is a content-dedup key, not a security boundary, so MD5's
    /// collision weakness is irrelevant here.
    pub fn from_source_url(url: &str) -> Self {
        let digest = md5::compute(url.as_bytes());
        Self(format!("{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The immutable identity half of an artifact row: `{id, name, kind}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub id: ArtifactId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Kind,
}

/// The mutable payload half of an artifact row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactData {
    pub url: String,
    pub size_mb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// A full artifact row: metadata + data. This is the shape returned by
/// register/get/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub metadata: ArtifactMetadata,
    pub data: ArtifactData,
}

impl Artifact {
    pub fn new(id: ArtifactId, name: String, kind: Kind, url: String, size_mb: f64) -> Self {
        Self {
            metadata: ArtifactMetadata { id, name, kind },
            data: ArtifactData {
                url,
                size_mb,
                download_url: None,
            },
        }
    }

    pub fn id(&self) -> &ArtifactId {
        &self.metadata.id
    }

    pub fn kind(&self) -> Kind {
        self.metadata.kind
    }
}

/// The request body of `POST /artifact/{kind}`: what a caller supplies to
/// register an artifact, before it has an id or a size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub url: String,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_derivation_is_deterministic() {
        let a = ArtifactId::from_source_url("https://huggingface.co/bert-base-uncased");
        let b = ArtifactId::from_source_url("https://huggingface.co/bert-base-uncased");
        assert_eq!(a, b);
    }

    #[test]
    fn id_derivation_differs_by_url() {
        let a = ArtifactId::from_source_url("https://huggingface.co/bert-base-uncased");
        let b = ArtifactId::from_source_url("https://huggingface.co/roberta-base");
        assert_ne!(a, b);
    }

    #[test]
    fn id_parse_rejects_bad_chars() {
        assert!(ArtifactId::parse("ok-id_123").is_err());
        assert!(ArtifactId::parse("ok-id-123").is_ok());
        assert!(ArtifactId::parse("").is_err());
        assert!(ArtifactId::parse("x".repeat(65)).is_err());
    }

    #[test]
    fn kind_roundtrips_through_str() {
        for kind in Kind::all() {
            let s = kind.to_string();
            assert_eq!(s.parse::<Kind>().unwrap(), kind);
        }
    }
}
