use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub mod album;
pub mod dispatch;
pub mod render;
pub mod startup_checks;
pub mod static_files;
pub mod thumbnails;

use album::ThumbSize;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub album: AlbumConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    /// Free-form values handed to templates as `site.site`.
    pub site: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlbumConfig {
    pub source_directory: PathBuf,
    pub recursive: bool,
    pub pregenerate_thumbnails: bool,
    pub refresh_interval_minutes: Option<u64>,
    pub jpeg_quality: u8,
    /// Whitelist for folders whose sidecars do not define one.
    pub default_thumb_sizes: Vec<ThumbSize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
    pub directory: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Gallerist".to_string(),
            log_level: "info".to_string(),
            site: BTreeMap::new(),
        }
    }
}

impl Default for AlbumConfig {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from("photos"),
            recursive: true,
            pregenerate_thumbnails: true,
            refresh_interval_minutes: None,
            jpeg_quality: 85,
            default_thumb_sizes: vec![ThumbSize::DEFAULT],
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            directory: None,
        }
    }
}

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub album: album::SharedAlbum,
    pub theme: Arc<render::Theme>,
    pub assets: static_files::ThemeAssets,
    pub config: Config,
}

pub fn album_builder(config: &AlbumConfig) -> album::AlbumBuilder {
    album::AlbumBuilder::new(
        album::BuildOptions::from(config),
        thumbnails::ThumbnailCache::new(config.jpeg_quality),
    )
}

/// Load the album configured in `config`, reconciling existing sidecars with
/// the disk.
pub async fn open_album(config: &Config) -> Result<album::SharedAlbum, album::AlbumError> {
    let store = album::AlbumStore::open(
        config.album.source_directory.clone(),
        album_builder(&config.album),
        true,
    )
    .await?;
    Ok(Arc::new(store))
}

pub fn load_theme(config: &Config) -> render::Theme {
    render::Theme::new(
        config.theme.name.clone(),
        config.theme.directory.clone(),
        render::SiteInfo {
            name: config.app.name.clone(),
            site: config.app.site.clone(),
        },
    )
}

async fn css_handler(State(app_state): State<AppState>, Path(path): Path<String>) -> impl IntoResponse {
    app_state.assets.serve("css", &path).await
}

async fn js_handler(State(app_state): State<AppState>, Path(path): Path<String>) -> impl IntoResponse {
    app_state.assets.serve("js", &path).await
}

async fn img_handler(State(app_state): State<AppState>, Path(path): Path<String>) -> impl IntoResponse {
    app_state.assets.serve("img", &path).await
}

async fn html_handler(State(app_state): State<AppState>, Path(path): Path<String>) -> impl IntoResponse {
    app_state.assets.serve("html", &path).await
}

pub async fn create_app(config: Config, album: album::SharedAlbum) -> Router {
    let theme = Arc::new(load_theme(&config));
    let assets = static_files::ThemeAssets::new(config.theme.directory.clone());

    let app_state = AppState {
        album,
        theme,
        assets,
        config,
    };

    Router::new()
        .route("/", axum::routing::get(dispatch::album_root_handler))
        .route("/css/{*path}", axum::routing::get(css_handler))
        .route("/js/{*path}", axum::routing::get(js_handler))
        .route("/img/{*path}", axum::routing::get(img_handler))
        .route("/html/{*path}", axum::routing::get(html_handler))
        .route("/{*path}", axum::routing::get(dispatch::album_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let user_agent = request
                        .headers()
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %request.method(),
                        path = %request.uri().path(),
                        query = ?request.uri().query(),
                        user_agent = %user_agent,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let size = response
                            .headers()
                            .get("content-length")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            size = %size,
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}
