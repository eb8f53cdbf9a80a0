use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

/// Serves the asset folders (`css`, `js`, `img`, `html`) of a theme.
#[derive(Clone)]
pub struct ThemeAssets {
    theme_dir: Option<PathBuf>,
}

impl ThemeAssets {
    pub fn new(theme_dir: Option<PathBuf>) -> Self {
        Self { theme_dir }
    }

    pub async fn serve(&self, kind: &str, path: &str) -> Response {
        let Some(theme_dir) = &self.theme_dir else {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        };

        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            error!("Path traversal attempt: {:?}", path);
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        }

        let file_path = theme_dir.join(kind).join(relative);
        debug!("Attempting to serve theme asset: {:?}", file_path);

        let content_type = mime_guess::from_path(&file_path)
            .first_or_octet_stream()
            .to_string();
        serve_file(&file_path, &content_type, cache_control(&content_type)).await
    }
}

fn cache_control(content_type: &str) -> &'static str {
    if content_type.starts_with("image/") {
        "public, max-age=31536000"
    } else if content_type.starts_with("text/css")
        || content_type.starts_with("application/javascript")
        || content_type.starts_with("text/javascript")
    {
        "public, max-age=300, must-revalidate"
    } else {
        "public, max-age=3600"
    }
}

/// Stream a file from disk with size and modification headers.
pub async fn serve_file(file_path: &Path, content_type: &str, cache_control: &str) -> Response {
    let metadata = match tokio::fs::metadata(file_path).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => {
            debug!("Not a regular file: {:?}", file_path);
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
        Err(e) => {
            debug!("Failed to get metadata for {:?}: {}", file_path, e);
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
    };

    let file = match File::open(file_path).await {
        Ok(file) => file,
        Err(e) => {
            debug!("Failed to open file {:?}: {}", file_path, e);
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
    };

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(header::CACHE_CONTROL, cache_control);

    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(UNIX_EPOCH)
    {
        response = response.header(header::LAST_MODIFIED, httpdate::fmt_http_date(modified));
        let etag = format!("\"{}-{}\"", duration.as_secs(), metadata.len());
        response = response.header(header::ETAG, etag);
    }

    match response.body(body) {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to build response for {:?}: {}", file_path, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
