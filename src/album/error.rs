use crate::thumbnails::ThumbnailError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlbumError {
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed metadata file {path:?}: {source}")]
    Sidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("Album task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AlbumError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> AlbumError + '_ {
        move |source| AlbumError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Logic bugs: retrying cannot help.
    pub fn is_consistency(&self) -> bool {
        matches!(self, AlbumError::Consistency(_))
    }
}
