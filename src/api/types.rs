//! Request/response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::error::SerializableError;
use crate::model::{ArtifactQuery, Kind};

/// Body of `PUT /artifacts/{kind}/{id}` and `POST /artifact/{kind}`. The
/// wire shape matches `RegisterRequest`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactBody {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /artifact/byRegEx`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegexBody {
    pub regex: String,
}

/// Query string of `GET /artifact/{kind}/{id}/cost?dependency=bool`.
#[derive(Debug, Clone, Deserialize)]
pub struct CostParams {
    #[serde(default, rename = "dependency")]
    pub include_dependencies: bool,
}

/// Query string of `POST /artifacts?offset=N`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OffsetParams {
    #[serde(default)]
    pub offset: Option<String>,
}

/// Body of `POST /artifacts?offset=N`: one or more query filters, unioned
/// and deduplicated by id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QueryBody {
    One(ArtifactQuery),
    Many(Vec<ArtifactQuery>),
}

impl QueryBody {
    pub fn into_vec(self) -> Vec<ArtifactQuery> {
        match self {
            Self::One(q) => vec![q],
            Self::Many(qs) => qs,
        }
    }
}

/// A parsed `{kind}` path segment; rejects anything outside
/// `model|dataset|code` with the same `BAD_REQUEST` the accessor would
/// produce for any other malformed input.
pub fn parse_kind(raw: &str) -> Result<Kind, crate::error::AccessError> {
    raw.parse()
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    #[serde(flatten)]
    pub inner: SerializableError,
}

impl From<&crate::error::AccessError> for ErrorBody {
    fn from(err: &crate::error::AccessError) -> Self {
        Self { inner: err.into() }
    }
}

/// `DEFERRED` acceptance body: the queue accepted the request but there's
/// no terminal result yet.
#[derive(Debug, Clone, Serialize)]
pub struct DeferredBody {
    pub status: &'static str,
    pub message: String,
}
