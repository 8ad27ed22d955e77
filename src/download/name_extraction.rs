//! Derives a human-readable artifact name from its source URL.
//!
//! Falls back to an `owner-repo`-shaped name built from the URL path when
//! no canonical name is otherwise available. No network lookup happens
//! here; `crate::download` backends already fetch hub metadata when they
//! need it and can override the name they return.

use crate::model::Kind;

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

fn strip_git_suffix(s: &str) -> &str {
    s.strip_suffix(".git").unwrap_or(s)
}

/// Best-effort name extraction. Never fails: an URL too short to carry a
/// clean name falls back to the last non-empty path segment, or the whole
/// host if the path is empty.
pub fn extract_name_from_url(url: &str, kind: Kind) -> String {
    let rest = strip_scheme(url);
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    match kind {
        Kind::Dataset => {
            if segments.len() >= 4 && segments[1] == "datasets" {
                strip_git_suffix(segments[3]).to_string()
            } else if segments.len() >= 2 {
                format!("{}-{}", segments[segments.len() - 2], segments[segments.len() - 1])
            } else {
                fallback(&segments, rest)
            }
        }
        Kind::Code => {
            if segments.len() >= 3 {
                format!("{}-{}", segments[1], strip_git_suffix(segments[2]))
            } else {
                fallback(&segments, rest)
            }
        }
        Kind::Model => {
            if segments.len() >= 3 {
                segments[2].to_string()
            } else if segments.len() == 2 {
                segments[1].to_string()
            } else {
                fallback(&segments, rest)
            }
        }
    }
}

fn fallback(segments: &[&str], rest: &str) -> String {
    segments.last().map(|s| s.to_string()).unwrap_or_else(|| rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_from_huggingface_url() {
        let name = extract_name_from_url("https://huggingface.co/bert-base-uncased", Kind::Model);
        assert_eq!(name, "bert-base-uncased");
    }

    #[test]
    fn model_name_with_namespace() {
        let name = extract_name_from_url("https://huggingface.co/google/bert-base", Kind::Model);
        assert_eq!(name, "bert-base");
    }

    #[test]
    fn dataset_name_from_huggingface_url() {
        let name =
            extract_name_from_url("https://huggingface.co/datasets/rajpurkar/squad", Kind::Dataset);
        assert_eq!(name, "squad");
    }

    #[test]
    fn code_name_from_github_url() {
        let name = extract_name_from_url("https://github.com/huggingface/transformers", Kind::Code);
        assert_eq!(name, "huggingface-transformers");
    }

    #[test]
    fn code_name_strips_git_suffix() {
        let name = extract_name_from_url("https://github.com/huggingface/transformers.git", Kind::Code);
        assert_eq!(name, "huggingface-transformers");
    }
}
