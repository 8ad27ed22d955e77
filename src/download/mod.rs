//! The downloader interface: fetches an artifact by URL+kind into a
//! scratch directory and reports its size.

pub mod backends;
pub mod error;
pub mod linked_names;
pub mod name_extraction;
pub mod traits;

pub use error::{DownloadError, DownloadResult};
pub use linked_names::extract_linked_names;
pub use name_extraction::extract_name_from_url;
pub use traits::Downloader;

use std::sync::Arc;

use crate::model::Kind;

/// Picks the downloader for a kind. Models and datasets are fetched from
/// the model hub; code is cloned from the code hosting service
///.
pub fn build(kind: Kind) -> Arc<dyn Downloader> {
    match kind {
        Kind::Model | Kind::Dataset => Arc::new(backends::huggingface::HuggingFaceDownloader::new()),
        Kind::Code => Arc::new(backends::github::GitHubDownloader::new()),
    }
}
