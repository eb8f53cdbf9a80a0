use super::builder::AlbumBuilder;
use super::metadata;
use super::walk::{FolderEntry, scan_folder};
use super::{Album, AlbumError, Group, GroupId};
use std::collections::HashSet;
use tracing::debug;

impl AlbumBuilder {
    /// Bring an already loaded group in line with the disk.
    ///
    /// Every known image is first marked as not existing and flipped back as
    /// it is found again, so images that vanished stay listed with
    /// `existing = false`. New files and folders are appended to the display
    /// orders; with `recursive`, folders that are gone are dropped and known
    /// subfolders reconciled in turn. The sidecar is rewritten afterwards.
    pub fn reconcile(&self, album: &mut Album, id: GroupId, recursive: bool) -> Result<(), AlbumError> {
        let folder = album.group(id).path.clone();
        debug!("Reconciling {:?} (recursive: {})", folder, recursive);

        for image in album.group_mut(id).pictures.values_mut() {
            image.existing = false;
        }

        let mut seen_images = Vec::new();
        let mut seen_folders = HashSet::new();

        for entry in scan_folder(&folder)? {
            match entry {
                FolderEntry::Image { path, file_name } => {
                    self.add_image(album, id, path, file_name.clone())?;
                    seen_images.push(file_name);
                }
                FolderEntry::Unreadable { path, file_name } => {
                    self.add_unreadable(album, id, path, file_name.clone());
                    seen_images.push(file_name);
                }
                FolderEntry::Folder { path, name } => {
                    if !recursive {
                        continue;
                    }
                    match album.group(id).sub_group(&name) {
                        Some(child) => {
                            self.reconcile(album, child, true)?;
                            album.group_mut(id).attach_sub_group(name.clone(), child);
                        }
                        None => {
                            self.add_sub_group(album, id, path, name.clone(), true, true)?;
                        }
                    }
                    seen_folders.insert(name);
                }
            }
        }

        let group = album.group_mut(id);
        confirm_rediscovered(group, &seen_images)?;
        if recursive {
            retain_sub_groups(group, &seen_folders);
        }

        metadata::write_sidecar(album.group(id))
    }
}

/// Flip `existing` back on for every image seen during the walk. A name
/// missing from the records here means the walk and the map disagree.
pub(crate) fn confirm_rediscovered(group: &mut Group, names: &[String]) -> Result<(), AlbumError> {
    for name in names {
        match group.pictures.get_mut(name) {
            Some(image) => image.existing = true,
            None => {
                return Err(AlbumError::Consistency(format!(
                    "{:?} disappeared from the records of {:?}",
                    name, group.path
                )));
            }
        }
    }
    Ok(())
}

fn retain_sub_groups(group: &mut Group, seen: &HashSet<String>) {
    let before = group.sub_group_order.len();
    group.sub_group_order.retain(|name| seen.contains(name));
    group.sub_groups.retain(|name, _| seen.contains(name));
    if group.sub_group_order.len() != before {
        debug!(
            "Dropped {} missing subfolders from {:?}",
            before - group.sub_group_order.len(),
            group.path
        );
    }
}
