use crate::Config;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Album source directory does not exist: {0:?}")]
    AlbumDirectoryMissing(std::path::PathBuf),

    #[error("Album source directory is not readable: {0}")]
    AlbumDirectoryUnreadable(#[from] std::io::Error),

    #[error("Invalid thumbnail size {width}x{height}: both sides must be non-zero")]
    InvalidThumbSize { width: u32, height: u32 },
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let album_dir = Path::new(&config.album.source_directory);
    if !album_dir.is_dir() {
        error!("Album source directory does not exist: {:?}", album_dir);
        errors.push(StartupCheckError::AlbumDirectoryMissing(album_dir.to_path_buf()));
    } else {
        info!("Album source directory exists: {:?}", album_dir);

        match tokio::fs::read_dir(album_dir).await {
            Ok(_) => info!("Album source directory is accessible"),
            Err(e) => {
                error!("Album source directory is not accessible: {}", e);
                errors.push(StartupCheckError::AlbumDirectoryUnreadable(e));
            }
        }
    }

    for size in &config.album.default_thumb_sizes {
        if size.width == 0 || size.height == 0 {
            error!("Thumbnail size {}x{} is not usable", size.width, size.height);
            errors.push(StartupCheckError::InvalidThumbSize {
                width: size.width,
                height: size.height,
            });
        }
    }

    match &config.theme.directory {
        Some(theme_dir) if !theme_dir.exists() => {
            warn!("Theme directory does not exist: {:?}", theme_dir);
            warn!("Built-in templates will be used instead");
        }
        Some(theme_dir) => info!("Theme directory exists: {:?}", theme_dir),
        None => info!("No theme directory configured, using built-in templates"),
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::ThumbSize;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_passes_with_existing_album() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.album.source_directory = temp_dir.path().to_path_buf();
        config.theme.directory = Some(temp_dir.path().join("no-theme"));

        assert!(perform_startup_checks(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_reports_every_critical_problem() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.album.source_directory = temp_dir.path().join("missing");
        config.album.default_thumb_sizes = vec![ThumbSize::new(0, 100), ThumbSize::DEFAULT];

        let errors = perform_startup_checks(&config).await.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], StartupCheckError::AlbumDirectoryMissing(_)));
        assert!(matches!(
            errors[1],
            StartupCheckError::InvalidThumbSize { width: 0, height: 100 }
        ));
    }
}
