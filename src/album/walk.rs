use super::{AlbumError, is_image};
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

/// One classified child of a folder.
#[derive(Debug)]
pub(crate) enum FolderEntry {
    Image { path: PathBuf, file_name: String },
    Folder { path: PathBuf, name: String },
    /// An image-looking entry we could not stat.
    Unreadable { path: PathBuf, file_name: String },
}

/// List the direct children of `folder` that matter to the album, sorted by
/// file name. Dot-files, the sidecar and non-image files are left out.
///
/// Failing to list `folder` itself is an error; a child that cannot be
/// stat'ed is reported as [`FolderEntry::Unreadable`] (or skipped, if it does
/// not look like an image) so its siblings still get processed.
pub(crate) fn scan_folder(folder: &Path) -> Result<Vec<FolderEntry>, AlbumError> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 || e.path().is_none_or(|p| p == folder) => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                return Err(AlbumError::Io {
                    path: folder.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                warn!("Cannot inspect {:?}: {}", path, e);
                if is_image(&file_name) && !file_name.starts_with('.') {
                    entries.push(FolderEntry::Unreadable { path, file_name });
                }
                continue;
            }
        };

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }

        let path = entry.path().to_path_buf();
        if entry.file_type().is_dir() {
            trace!("Found folder {:?}", path);
            entries.push(FolderEntry::Folder {
                path,
                name: file_name,
            });
        } else if is_image(&file_name) {
            trace!("Found image {:?}", path);
            entries.push(FolderEntry::Image { path, file_name });
        }
    }

    Ok(entries)
}
