use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot encode thumbnail {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Thumbnail task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ThumbnailError {
    /// Decode failures mean the source itself is unusable, not that the
    /// cache is broken.
    pub fn is_decode(&self) -> bool {
        matches!(self, ThumbnailError::Decode { .. })
    }

    pub fn is_missing_source(&self) -> bool {
        matches!(
            self,
            ThumbnailError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
