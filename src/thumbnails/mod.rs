// Thumbnail cache - derived artifacts stored next to their source images
mod error;
mod format;

pub use error::ThumbnailError;
pub use format::OutputFormat;

use crate::album::ThumbSize;
use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{debug, info};

/// Artifact path for `source` at `size`: `<source>_<width>_x_<height>`.
pub fn thumbnail_path(source: &Path, size: ThumbSize) -> PathBuf {
    let mut name = OsString::from(source.as_os_str());
    name.push(size.suffix());
    PathBuf::from(name)
}

type KeyLock = Arc<Mutex<()>>;

/// A thumbnail on disk and the encoding it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl Thumbnail {
    /// An artifact from an earlier run: its format is read back from the file.
    fn existing(path: PathBuf) -> Result<Self, ThumbnailError> {
        let format = format::detect_artifact(&path)?;
        Ok(Self { path, format })
    }
}

/// Cache of resized copies keyed by (source path, width, height).
///
/// Artifacts are generated on first request and kept forever: an artifact
/// already on disk is served as-is even if the source changed afterwards.
/// Concurrent requests for the same missing key are serialized so the
/// source is decoded and the artifact written only once.
#[derive(Clone)]
pub struct ThumbnailCache {
    jpeg_quality: u8,
    in_flight: Arc<Mutex<HashMap<PathBuf, KeyLock>>>,
}

impl ThumbnailCache {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Async entry point for request handlers; the work itself runs on the
    /// blocking pool.
    pub async fn ensure(&self, source: PathBuf, size: ThumbSize) -> Result<Thumbnail, ThumbnailError> {
        let cache = self.clone();
        tokio::task::spawn_blocking(move || cache.ensure_blocking(&source, size)).await?
    }

    /// Return the artifact for `source` at `size`, generating it if missing.
    pub fn ensure_blocking(&self, source: &Path, size: ThumbSize) -> Result<Thumbnail, ThumbnailError> {
        let target = thumbnail_path(source, size);
        if target.is_file() {
            return Thumbnail::existing(target);
        }

        let key_lock = self.lock_for(&target);
        let result = {
            let _guard = key_lock.lock().unwrap_or_else(|e| e.into_inner());
            // Whoever held the lock before us may have produced it already.
            if target.is_file() {
                debug!("Thumbnail {:?} generated by a concurrent request", target);
                Thumbnail::existing(target.clone())
            } else {
                self.generate(source, &target, size).map(|format| Thumbnail {
                    path: target.clone(),
                    format,
                })
            }
        };
        self.release(&target, key_lock);

        result
    }

    fn lock_for(&self, target: &Path) -> KeyLock {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight
            .entry(target.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release(&self, target: &Path, key_lock: KeyLock) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map and this caller hold it: nobody else is waiting.
        if Arc::strong_count(&key_lock) == 2 {
            in_flight.remove(target);
        }
        // Drop our handle while the map is still locked so the next caller
        // counts correctly.
        drop(key_lock);
    }

    fn generate(
        &self,
        source: &Path,
        target: &Path,
        size: ThumbSize,
    ) -> Result<OutputFormat, ThumbnailError> {
        let (img, detected) = format::decode_source(source)?;
        let output_format = OutputFormat::from_detected(detected);
        debug!(
            "Generating {}x{} thumbnail for {:?} (detected {:?}, writing {:?})",
            size.width, size.height, source, detected, output_format
        );

        let resized = format::fit_within(&img, size.width, size.height);

        // Write next to the target and rename so readers never see a partial file.
        let mut partial = OsString::from(target.as_os_str());
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        let file = std::fs::File::create(&partial).map_err(|source| ThumbnailError::Io {
            path: partial.clone(),
            source,
        })?;
        if let Err(source) = format::encode(&resized, file, output_format, self.jpeg_quality) {
            let _ = std::fs::remove_file(&partial);
            return Err(ThumbnailError::Encode {
                path: target.to_path_buf(),
                source,
            });
        }
        if let Err(source) = std::fs::rename(&partial, target) {
            let _ = std::fs::remove_file(&partial);
            return Err(ThumbnailError::Io {
                path: target.to_path_buf(),
                source,
            });
        }

        info!("Created thumbnail {:?}", target);
        Ok(output_format)
    }
}
