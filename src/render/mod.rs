// Theme module - Liquid templates, error pages and theme scaffolding
mod defaults;
mod error;
mod pages;

pub use error::ThemeError;
pub use pages::{FolderPage, ImagePage, SiteInfo, markdown_to_html};

use crate::album::{Album, GroupId};
use axum::http::StatusCode;
use serde::Serialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Asset folders a theme may ship, served under `/<name>/`.
pub const ASSET_DIRS: [&str; 4] = ["css", "js", "img", "html"];

pub struct Theme {
    name: String,
    directory: Option<PathBuf>,
    site: SiteInfo,
    cache: RwLock<HashMap<String, CachedTemplate>>,
}

struct CachedTemplate {
    content: String,
    modified: SystemTime,
}

impl Theme {
    pub fn new(name: String, directory: Option<PathBuf>, site: SiteInfo) -> Self {
        Self {
            name,
            directory,
            site,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn render_folder(&self, album: &Album, id: GroupId) -> Result<String, ThemeError> {
        let page = FolderPage::new(album, id, &self.site);
        self.render(defaults::PAGE_TEMPLATE_NAME, &page).await
    }

    /// `Ok(None)` when the image is not part of the folder.
    pub async fn render_image(
        &self,
        album: &Album,
        id: GroupId,
        file_name: &str,
    ) -> Result<Option<String>, ThemeError> {
        match ImagePage::new(album, id, file_name, &self.site) {
            Some(page) => self.render(defaults::SINGLE_TEMPLATE_NAME, &page).await.map(Some),
            None => Ok(None),
        }
    }

    /// Body for an error response: the theme's `html/<code>.html` when it
    /// has one, a built-in page otherwise.
    pub async fn error_page(&self, status: StatusCode) -> String {
        if let Some(dir) = &self.directory {
            let path = dir.join("html").join(format!("{}.html", status.as_u16()));
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => return content,
                Err(e) => debug!("No themed error page at {:?}: {}", path, e),
            }
        }
        if status == StatusCode::NOT_FOUND {
            defaults::NOT_FOUND_HTML.to_string()
        } else {
            defaults::SERVER_ERROR_HTML.to_string()
        }
    }

    async fn render<T: Serialize>(&self, template_name: &str, page: &T) -> Result<String, ThemeError> {
        let source = self.load_template(template_name).await?;
        let globals = liquid::to_object(page)?;

        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|source| ThemeError::Template {
                template: template_name.to_string(),
                source,
            })?;
        let template = parser.parse(&source).map_err(|source| ThemeError::Template {
            template: template_name.to_string(),
            source,
        })?;
        template.render(&globals).map_err(|source| ThemeError::Template {
            template: template_name.to_string(),
            source,
        })
    }

    /// Theme template if present (cached until its mtime changes), built-in
    /// default otherwise.
    async fn load_template(&self, name: &str) -> Result<String, ThemeError> {
        let Some(dir) = &self.directory else {
            return Ok(builtin(name));
        };
        let template_path = dir.join("templates").join(name);

        let metadata = match tokio::fs::metadata(&template_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Theme has no {}, using built-in template", name);
                return Ok(builtin(name));
            }
            Err(source) => {
                return Err(ThemeError::Io {
                    path: template_path,
                    source,
                });
            }
        };
        let modified = metadata.modified().map_err(|source| ThemeError::Io {
            path: template_path.clone(),
            source,
        })?;

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.get(name)
            && cached.modified >= modified
        {
            debug!("Using cached template for {}", name);
            return Ok(cached.content.clone());
        }

        info!("Loading template {:?} of theme '{}'", template_path, self.name);
        let content = tokio::fs::read_to_string(&template_path)
            .await
            .map_err(|source| ThemeError::Io {
                path: template_path.clone(),
                source,
            })?;
        cache.insert(
            name.to_string(),
            CachedTemplate {
                content: content.clone(),
                modified,
            },
        );
        Ok(content)
    }
}

fn builtin(name: &str) -> String {
    defaults::template(name).unwrap_or_default().to_string()
}

#[derive(Serialize)]
struct ThemeManifest<'a> {
    name: &'a str,
    version: &'a str,
    templates: [&'a str; 2],
}

/// Scaffold a new theme named `name` in `directory`.
///
/// Existing files are left untouched. Returns the files that were written.
pub fn create_theme(name: &str, directory: &Path) -> Result<Vec<PathBuf>, ThemeError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ThemeError::Io { path, source }
    };

    for sub in ["templates"].iter().chain(ASSET_DIRS.iter()) {
        let dir = directory.join(sub);
        std::fs::create_dir_all(&dir).map_err(io_err(&dir))?;
    }

    let manifest = ThemeManifest {
        name,
        version: env!("CARGO_PKG_VERSION"),
        templates: [defaults::PAGE_TEMPLATE_NAME, defaults::SINGLE_TEMPLATE_NAME],
    };
    let manifest = serde_json::to_string_pretty(&manifest)?;

    let files: [(PathBuf, &str); 6] = [
        (directory.join("theme.json"), manifest.as_str()),
        (
            directory.join("templates").join(defaults::PAGE_TEMPLATE_NAME),
            defaults::PAGE_TEMPLATE,
        ),
        (
            directory.join("templates").join(defaults::SINGLE_TEMPLATE_NAME),
            defaults::SINGLE_TEMPLATE,
        ),
        (directory.join("css").join("style.css"), defaults::STYLE_CSS),
        (directory.join("html").join("404.html"), defaults::NOT_FOUND_HTML),
        (directory.join("html").join("500.html"), defaults::SERVER_ERROR_HTML),
    ];

    let mut written = Vec::new();
    for (path, content) in files {
        if path.exists() {
            info!("Keeping existing {:?}", path);
            continue;
        }
        std::fs::write(&path, content).map_err(io_err(&path))?;
        info!("Created {:?}", path);
        written.push(path);
    }
    Ok(written)
}
