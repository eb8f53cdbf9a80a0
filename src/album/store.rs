use super::{Album, AlbumBuilder, AlbumError};
use crate::thumbnails::ThumbnailCache;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

pub type SharedAlbum = Arc<AlbumStore>;

/// Owner of the live album tree.
///
/// Requests read an immutable snapshot. A refresh builds a complete new tree
/// on the blocking pool and swaps it in, so nobody ever sees a tree halfway
/// through reconciliation.
pub struct AlbumStore {
    root: PathBuf,
    builder: AlbumBuilder,
    current: RwLock<Arc<Album>>,
    refresh_lock: Mutex<()>,
}

impl AlbumStore {
    /// Load the album at `root`, reconciling existing sidecars when `update`
    /// is set.
    pub async fn open(root: PathBuf, builder: AlbumBuilder, update: bool) -> Result<Self, AlbumError> {
        let album = build_off_thread(&builder, &root, update).await?;
        Ok(Self {
            root,
            builder,
            current: RwLock::new(Arc::new(album)),
            refresh_lock: Mutex::new(()),
        })
    }

    pub async fn snapshot(&self) -> Arc<Album> {
        self.current.read().await.clone()
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        self.builder.thumbnails()
    }

    /// Reconcile the whole tree with the disk and publish the result.
    pub async fn refresh(&self) -> Result<(), AlbumError> {
        let _guard = self.refresh_lock.lock().await;
        info!("Reconciling album at {:?}", self.root);

        let album = build_off_thread(&self.builder, &self.root, true).await?;
        *self.current.write().await = Arc::new(album);

        info!("Album reconciled");
        Ok(())
    }

    pub fn start_background_refresh(store: SharedAlbum, interval_minutes: u64) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_minutes * 60));
            interval.tick().await; // Skip the first immediate tick

            loop {
                interval.tick().await;
                info!("Starting scheduled album reconciliation");

                if let Err(e) = store.refresh().await {
                    error!("Failed to reconcile album: {}", e);
                }
            }
        });
    }
}

async fn build_off_thread(builder: &AlbumBuilder, root: &Path, update: bool) -> Result<Album, AlbumError> {
    let builder = builder.clone();
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || builder.build(&root, update)).await?
}
