use super::metadata;
use super::walk::{FolderEntry, scan_folder};
use super::{Album, AlbumError, Group, GroupId, Image, ThumbSize};
use crate::thumbnails::ThumbnailCache;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Descend into subfolders.
    pub recursive: bool,
    /// Whitelist for folders whose ancestors never define one.
    pub default_thumb_sizes: Vec<ThumbSize>,
    /// Generate every whitelisted thumbnail when an image is walked.
    pub pregenerate_thumbnails: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            default_thumb_sizes: vec![ThumbSize::DEFAULT],
            pregenerate_thumbnails: true,
        }
    }
}

impl From<&crate::AlbumConfig> for BuildOptions {
    fn from(config: &crate::AlbumConfig) -> Self {
        Self {
            recursive: config.recursive,
            default_thumb_sizes: config.default_thumb_sizes.clone(),
            pregenerate_thumbnails: config.pregenerate_thumbnails,
        }
    }
}

/// Turns folders on disk into an [`Album`], merging what the sidecars say.
#[derive(Clone)]
pub struct AlbumBuilder {
    options: BuildOptions,
    thumbnails: ThumbnailCache,
}

impl AlbumBuilder {
    pub fn new(options: BuildOptions, thumbnails: ThumbnailCache) -> Self {
        Self {
            options,
            thumbnails,
        }
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    /// Load the album rooted at `root`. With `update`, folders that already
    /// have a sidecar are reconciled against the disk and rewritten.
    pub fn build(&self, root: &Path, update: bool) -> Result<Album, AlbumError> {
        let root = std::fs::canonicalize(root).map_err(AlbumError::io(root))?;
        info!(
            "Loading album at {:?} (recursive: {}, update: {})",
            root, self.options.recursive, update
        );

        let sizes = if self.options.default_thumb_sizes.is_empty() {
            vec![ThumbSize::DEFAULT]
        } else {
            self.options.default_thumb_sizes.clone()
        };

        let mut album = Album::new();
        self.load_group(&mut album, root, None, &sizes, self.options.recursive, update)?;
        Ok(album)
    }

    /// Load one folder into the arena.
    ///
    /// A folder without sidecar is built from disk and its sidecar written.
    /// A folder with one is taken from it, and reconciled when `update` is
    /// set; otherwise only the subfolders the sidecar lists are loaded.
    /// Without `recursive` no subfolder is loaded either way.
    pub(crate) fn load_group(
        &self,
        album: &mut Album,
        path: PathBuf,
        parent: Option<GroupId>,
        inherited_sizes: &[ThumbSize],
        recursive: bool,
        update: bool,
    ) -> Result<GroupId, AlbumError> {
        let sidecar = metadata::read_sidecar(&path)?;
        let id = album.push_group(Group::empty(path.clone(), parent, inherited_sizes.to_vec()));

        match sidecar {
            None => {
                debug!("No metadata in {:?}, constructing from disk", path);
                self.construct(album, id, recursive)?;
                metadata::write_sidecar(album.group(id))?;
            }
            Some(document) => {
                let mut group = document.into_group(path, parent, inherited_sizes, id);
                if !recursive {
                    // Subfolders stay unloaded but keep their place in the sidecar.
                    group.detached_sub_group_order = Some(std::mem::take(&mut group.sub_group_order));
                }
                *album.group_mut(id) = group;

                if update {
                    self.reconcile(album, id, recursive)?;
                } else if recursive {
                    self.load_listed_sub_groups(album, id, true)?;
                }
            }
        }

        Ok(id)
    }

    /// Fill a fresh group purely from what is on disk.
    fn construct(&self, album: &mut Album, id: GroupId, recursive: bool) -> Result<(), AlbumError> {
        let folder = album.group(id).path.clone();
        for entry in scan_folder(&folder)? {
            match entry {
                FolderEntry::Image { path, file_name } => {
                    self.add_image(album, id, path, file_name)?;
                }
                FolderEntry::Unreadable { path, file_name } => {
                    self.add_unreadable(album, id, path, file_name);
                }
                FolderEntry::Folder { path, name } => {
                    if recursive {
                        self.add_sub_group(album, id, path, name, true, false)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Load the subfolders named by the sidecar, dropping the ones whose
    /// directory is gone.
    fn load_listed_sub_groups(
        &self,
        album: &mut Album,
        id: GroupId,
        recursive: bool,
    ) -> Result<(), AlbumError> {
        let (folder, names) = {
            let group = album.group(id);
            (group.path.clone(), group.sub_group_order.clone())
        };

        let mut kept = Vec::with_capacity(names.len());
        for name in names {
            let child_path = folder.join(&name);
            if !is_plain_name(&name) || !child_path.is_dir() {
                debug!("Dropping missing subfolder {:?} from {:?}", name, folder);
                continue;
            }
            let sizes = album.group(id).allowed_thumb_sizes.clone();
            let child = self.load_group(album, child_path, Some(id), &sizes, recursive, false)?;
            album.group_mut(id).sub_groups.insert(name.clone(), child);
            kept.push(name);
        }
        album.group_mut(id).sub_group_order = kept;
        Ok(())
    }

    /// Build a child group for a subfolder that has none in memory yet.
    pub(crate) fn add_sub_group(
        &self,
        album: &mut Album,
        id: GroupId,
        path: PathBuf,
        name: String,
        recursive: bool,
        update: bool,
    ) -> Result<GroupId, AlbumError> {
        let sizes = album.group(id).allowed_thumb_sizes.clone();
        let child = self.load_group(album, path, Some(id), &sizes, recursive, update)?;
        album.group_mut(id).attach_sub_group(name, child);
        Ok(child)
    }

    /// Register an image found on disk. Known images keep every curator
    /// field; new ones start visible with empty title and description.
    pub(crate) fn add_image(
        &self,
        album: &mut Album,
        id: GroupId,
        path: PathBuf,
        file_name: String,
    ) -> Result<(), AlbumError> {
        debug!("Considering file {:?}", path);
        let accessible = std::fs::metadata(&path).is_ok();

        let group = album.group_mut(id);
        match group.pictures.get_mut(&file_name) {
            Some(image) => {
                image.path = path.clone();
                image.accessible = accessible;
                image.group = id;
            }
            None => {
                group.order.push(file_name.clone());
                group.pictures.insert(
                    file_name.clone(),
                    Image::discovered(path.clone(), file_name.clone(), accessible, id),
                );
            }
        }

        if accessible && self.options.pregenerate_thumbnails {
            self.pregenerate_thumbnails(album, id, &path, &file_name)?;
        }
        Ok(())
    }

    /// An image we could not stat: keep it listed but flagged.
    pub(crate) fn add_unreadable(&self, album: &mut Album, id: GroupId, path: PathBuf, file_name: String) {
        warn!("Image {:?} is not accessible", path);
        let group = album.group_mut(id);
        match group.pictures.get_mut(&file_name) {
            Some(image) => image.accessible = false,
            None => {
                group.order.push(file_name.clone());
                group.pictures.insert(
                    file_name.clone(),
                    Image::discovered(path, file_name, false, id),
                );
            }
        }
    }

    fn pregenerate_thumbnails(
        &self,
        album: &mut Album,
        id: GroupId,
        path: &Path,
        file_name: &str,
    ) -> Result<(), AlbumError> {
        let sizes = album.group(id).allowed_thumb_sizes.clone();
        for size in sizes {
            match self.thumbnails.ensure_blocking(path, size) {
                Ok(_) => {}
                Err(e) if e.is_decode() => {
                    // Not fatal: retried when the thumbnail is first requested.
                    warn!("Skipping thumbnails for {:?}: {}", path, e);
                    if let Some(image) = album.group_mut(id).pictures.get_mut(file_name) {
                        image.accessible = false;
                    }
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Sidecar folder names must name a direct child.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(std::path::MAIN_SEPARATOR)
}

