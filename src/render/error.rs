use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error in {template}: {source}")]
    Template {
        template: String,
        #[source]
        source: liquid::Error,
    },

    #[error("Cannot build template context: {0}")]
    Context(#[from] liquid::Error),

    #[error("Cannot write theme manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
