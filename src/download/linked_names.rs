//! Mines a model's linked dependency names from its README front matter
//! and body.
//!
//! Linked datasets and the parent model come from the README's YAML front
//! matter; linked codebases are GitHub URLs found in the body text. The
//! parent model is read from the `base_model` front-matter key that
//! Hugging Face model cards use to record a fine-tuning parent.

use gray_matter::engine::YAML;
use gray_matter::Matter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::storage::{LinkedNames, ParentLink};

#[derive(Debug, Default, Deserialize)]
struct ModelCardFrontMatter {
    #[serde(default)]
    datasets: Vec<String>,
    #[serde(default)]
    base_model: Option<BaseModelField>,
}

/// Hugging Face model cards allow `base_model` to be a single string or a
/// list; the registry only records one parent, so a list keeps its first
/// entry.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BaseModelField {
    Single(String),
    Many(Vec<String>),
}

impl BaseModelField {
    fn first(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s.as_str()),
            Self::Many(v) => v.first().map(|s| s.as_str()),
        }
    }
}

static GITHUB_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://github\.com/([\w.-]+)/([\w.-]+)").unwrap());

/// Parses a model README (with or without YAML front matter) into the
/// dataset/codebase/parent-model names an edge should be created for.
pub fn extract_linked_names(readme: &str) -> LinkedNames {
    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(readme);
    let front: ModelCardFrontMatter = parsed
        .data
        .as_ref()
        .and_then(|pod| pod.deserialize().ok())
        .unwrap_or_default();

    let parent_model = front.base_model.as_ref().and_then(|f| f.first()).map(|name| ParentLink {
        name: name.trim_end_matches(".git").to_string(),
        relation_label: "finetune".to_string(),
        source_tag: "model_card".to_string(),
    });

    let codebases = GITHUB_URL
        .captures_iter(readme)
        .map(|c| format!("{}-{}", &c[1], c[2].trim_end_matches(".git")))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    LinkedNames {
        datasets: front.datasets,
        codebases,
        parent_model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_datasets_from_front_matter() {
        let readme = "---\ndatasets:\n  - squad\n  - glue\n---\n# Model\n";
        let linked = extract_linked_names(readme);
        assert_eq!(linked.datasets, vec!["squad", "glue"]);
    }

    #[test]
    fn extracts_parent_model_from_base_model() {
        let readme = "---\nbase_model: bert-base-uncased\n---\n# Model\n";
        let linked = extract_linked_names(readme);
        let parent = linked.parent_model.expect("parent");
        assert_eq!(parent.name, "bert-base-uncased");
        assert_eq!(parent.relation_label, "finetune");
    }

    #[test]
    fn extracts_codebase_links_from_body() {
        let readme = "See https://github.com/huggingface/transformers for training code.";
        let linked = extract_linked_names(readme);
        assert_eq!(linked.codebases, vec!["huggingface-transformers"]);
    }

    #[test]
    fn readme_without_front_matter_is_empty_linked_set() {
        let linked = extract_linked_names("# Just a plain readme, no metadata.");
        assert!(linked.datasets.is_empty());
        assert!(linked.codebases.is_empty());
        assert!(linked.parent_model.is_none());
    }
}
