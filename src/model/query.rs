//! Paged listing queries.

use serde::{Deserialize, Serialize};

use super::Kind;

/// A paged listing request. `name = "*"` matches all artifacts regardless
/// of name; otherwise only exact-name matches are returned. `kinds`
/// defaults to all three kinds when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactQuery {
    pub name: String,
    #[serde(default)]
    pub kinds: Option<Vec<Kind>>,
}

impl ArtifactQuery {
    pub const WILDCARD: &'static str = "*";

    pub fn matches_all_names(&self) -> bool {
        self.name == Self::WILDCARD
    }

    pub fn kinds_or_default(&self) -> Vec<Kind> {
        self.kinds.clone().unwrap_or_else(|| Kind::all().to_vec())
    }
}
