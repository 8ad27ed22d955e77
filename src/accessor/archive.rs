//! Packs a downloaded scratch tree into a single gzip'd tarball before
//! upload, and reads a model's README back out of one.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io;
use std::path::Path;

/// READMEs are conventionally named with this stem; the hub/codebase
/// sources consistently use one of these exact spellings.
const README_CANDIDATES: &[&str] = &["README.md", "README.MD", "readme.md", "README", "README.rst"];

pub fn tar_gzip_dir(root: &Path) -> io::Result<Vec<u8>> {
    let buf = Vec::new();
    let encoder = GzEncoder::new(buf, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(".", root)?;
    let encoder = builder.into_inner()?;
    encoder.finish()
}

pub async fn read_readme(root: &Path) -> Option<String> {
    for candidate in README_CANDIDATES {
        let path = root.join(candidate);
        if let Ok(body) = tokio::fs::read_to_string(&path).await {
            return Some(body);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tar_gzip_round_trip_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.txt"), b"hello").await.unwrap();
        let archive = tar_gzip_dir(dir.path()).unwrap();
        assert!(!archive.is_empty());

        let decoder = flate2::read::GzDecoder::new(&archive[..]);
        let mut ar = tar::Archive::new(decoder);
        let entries: Vec<_> = ar.entries().unwrap().collect();
        assert!(!entries.is_empty());
    }

    #[tokio::test]
    async fn finds_readme_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("README.md"), b"# hi").await.unwrap();
        assert_eq!(read_readme(dir.path()).await, Some("# hi".to_string()));
    }

    #[tokio::test]
    async fn missing_readme_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_readme(dir.path()).await, None);
    }
}
