use super::resolver::{Resolution, resolve};
use crate::AppState;
use crate::static_files::serve_file;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, error, warn};

#[derive(Debug, Default, Deserialize)]
pub struct AlbumQuery {
    pub raw: Option<String>,
}

impl AlbumQuery {
    pub fn is_raw(&self) -> bool {
        self.raw.as_deref() == Some("true")
    }
}

#[axum::debug_handler]
pub async fn album_root_handler(
    State(app_state): State<AppState>,
    Query(query): Query<AlbumQuery>,
) -> Response {
    album_handler(State(app_state), Path(String::new()), Query(query)).await
}

#[axum::debug_handler]
pub async fn album_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<AlbumQuery>,
) -> Response {
    let album = app_state.album.snapshot().await;
    let resolution = resolve(&album, &path, query.is_raw());
    debug!("Resolved {:?} to {:?}", path, resolution);

    match resolution {
        Resolution::Folder(id) => match app_state.theme.render_folder(&album, id).await {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!("Template rendering error for {:?}: {}", path, e);
                server_error(&app_state).await
            }
        },
        Resolution::ImagePage { group, file_name } => {
            match app_state.theme.render_image(&album, group, &file_name).await {
                Ok(Some(html)) => Html(html).into_response(),
                Ok(None) => not_found(&app_state).await,
                Err(e) => {
                    error!("Template rendering error for {:?}: {}", path, e);
                    server_error(&app_state).await
                }
            }
        }
        Resolution::RawImage { group, file_name } => {
            let Some(image) = album.image(group, &file_name) else {
                return not_found(&app_state).await;
            };
            let content_type = mime_guess::from_path(&image.path)
                .first_or_octet_stream()
                .to_string();
            serve_file(&image.path, &content_type, "public, max-age=3600").await
        }
        Resolution::Thumbnail {
            group,
            file_name,
            size,
        } => {
            let Some(image) = album.image(group, &file_name) else {
                return not_found(&app_state).await;
            };
            let source = image.path.clone();
            // The snapshot is not needed while the thumbnail is generated.
            drop(album);

            match app_state.album.thumbnails().ensure(source, size).await {
                Ok(thumbnail) => {
                    serve_file(
                        &thumbnail.path,
                        thumbnail.format.mime_type(),
                        "public, max-age=31536000",
                    )
                    .await
                }
                Err(e) if e.is_missing_source() => {
                    warn!("Thumbnail requested for missing image {:?}: {}", path, e);
                    not_found(&app_state).await
                }
                Err(e) => {
                    error!("Failed to produce thumbnail for {:?}: {}", path, e);
                    server_error(&app_state).await
                }
            }
        }
        Resolution::Forbidden => {
            warn!(path = %path, "Thumbnail size not allowed");
            (StatusCode::FORBIDDEN, "Thumbnail size not allowed").into_response()
        }
        Resolution::NotFound => not_found(&app_state).await,
    }
}

async fn not_found(app_state: &AppState) -> Response {
    let body = app_state.theme.error_page(StatusCode::NOT_FOUND).await;
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

async fn server_error(app_state: &AppState) -> Response {
    let body = app_state
        .theme
        .error_page(StatusCode::INTERNAL_SERVER_ERROR)
        .await;
    (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
}
