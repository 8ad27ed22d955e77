//! Ramp-up-time heuristic metric: checks directory structure and
//! install-instruction presence in the local downloaded tree rather than
//! a live hub API call.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::RegistryResult;
use crate::metrics::traits::{DownloadedTree, Metric, MetricValue};
use crate::model::Artifact;

static ARXIV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(arxiv\.org/(abs|pdf)/\d{4}\.\d{4,5}|arxiv:\d{4}\.\d{4,5})").unwrap());

const STRUCTURE_DIRS: &[&[&str]] = &[
    &["src"],
    &["scripts"],
    &["configs", "config"],
    &["tests", "test"],
    &["docs", "documentation"],
    &["examples", "example"],
];

fn has_any_dir(root: &std::path::Path, names: &[&str]) -> bool {
    names.iter().any(|n| root.join(n).is_dir())
}

fn structure_score(root: &std::path::Path) -> f64 {
    let hits = STRUCTURE_DIRS.iter().filter(|names| has_any_dir(root, names)).count();
    hits as f64 / STRUCTURE_DIRS.len() as f64
}

fn readme_text(root: &std::path::Path) -> Option<String> {
    ["README.md", "README.rst", "README.txt", "README"]
        .iter()
        .find_map(|name| std::fs::read_to_string(root.join(name)).ok())
}

fn has_install_instructions(text: &str) -> f64 {
    let lower = text.to_lowercase();
    if ["pip install", "apt install", "conda install", "cargo install"]
        .iter()
        .any(|s| lower.contains(s))
    {
        1.0
    } else if lower.contains("install") {
        0.5
    } else {
        0.0
    }
}

fn has_arxiv_link(root: &std::path::Path) -> f64 {
    let hit = WalkDir::new(root)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| std::fs::read_to_string(e.path()).ok())
        .any(|text| ARXIV_RE.is_match(&text));
    if hit {
        1.0
    } else {
        0.0
    }
}

pub struct RampUpMetric {
    weight: f64,
}

impl RampUpMetric {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

#[async_trait]
impl Metric for RampUpMetric {
    fn name(&self) -> &str {
        "ramp_up_time"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn score(&self, tree: &DownloadedTree, _artifact: &Artifact) -> RegistryResult<MetricValue> {
        let root = tree.root().to_path_buf();
        let score = tokio::task::spawn_blocking(move || {
            let readme = readme_text(&root).unwrap_or_default();
            let components = [
                structure_score(&root),
                has_install_instructions(&readme),
                has_arxiv_link(&root),
                if readme.len() > 200 { 1.0 } else { readme.len() as f64 / 200.0 },
            ];
            components.iter().sum::<f64>() / components.len() as f64
        })
        .await
        .map_err(|e| crate::error::RegistryError::rating(format!("ramp_up task panicked: {e}")))?;

        Ok(MetricValue::Scalar(score.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactId, Kind};

    fn artifact() -> Artifact {
        Artifact::new(ArtifactId::from_source_url("u"), "m".to_string(), Kind::Model, "u".to_string(), 1.0)
    }

    #[tokio::test]
    async fn rich_tree_scores_higher_than_empty() {
        let rich = tempfile::tempdir().unwrap();
        std::fs::create_dir(rich.path().join("tests")).unwrap();
        std::fs::create_dir(rich.path().join("docs")).unwrap();
        std::fs::write(
            rich.path().join("README.md"),
            "# Model\n\nRun `pip install foo` to get started. ".repeat(10),
        )
        .unwrap();

        let empty = tempfile::tempdir().unwrap();

        let metric = RampUpMetric::new(0.1);
        let rich_score = metric
            .score(&DownloadedTree::new(rich.path()), &artifact())
            .await
            .unwrap()
            .as_scalar();
        let empty_score = metric
            .score(&DownloadedTree::new(empty.path()), &artifact())
            .await
            .unwrap()
            .as_scalar();
        assert!(rich_score > empty_score);
    }
}
