use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the per-folder metadata sidecar.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Lower-cased extensions recognised as images.
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".tiff", ".gif"];

pub fn is_image(file_name: &str) -> bool {
    if file_name == METADATA_FILE_NAME {
        return false;
    }
    let lower = file_name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Bounding box for a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbSize {
    pub const DEFAULT: ThumbSize = ThumbSize {
        width: 320,
        height: 213,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Suffix appended to an image file name to name its thumbnail.
    pub fn suffix(&self) -> String {
        format!("_{}_x_{}", self.width, self.height)
    }
}

/// Index of a [`Group`] inside its [`Album`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

/// A single picture's metadata inside a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub path: PathBuf,
    pub file_name: String,
    pub title: String,
    pub description: String,
    /// Curator-controlled display toggle.
    pub visible: bool,
    /// Whether the file was seen on disk during the latest walk.
    pub existing: bool,
    /// Best guess at whether we can read the file.
    pub accessible: bool,
    pub group: GroupId,
}

impl Image {
    pub(crate) fn discovered(path: PathBuf, file_name: String, accessible: bool, group: GroupId) -> Self {
        Self {
            path,
            file_name,
            title: String::new(),
            description: String::new(),
            visible: true,
            existing: true,
            accessible,
            group,
        }
    }

    pub fn is_displayed(&self) -> bool {
        self.visible && self.existing
    }
}

/// A folder of the album.
#[derive(Debug, Clone)]
pub struct Group {
    pub path: PathBuf,
    pub folder_name: String,
    pub title: String,
    pub description: String,
    pub pictures: BTreeMap<String, Image>,
    pub order: Vec<String>,
    pub sub_groups: BTreeMap<String, GroupId>,
    pub sub_group_order: Vec<String>,
    pub allowed_thumb_sizes: Vec<ThumbSize>,
    pub parent: Option<GroupId>,
    /// Subfolder order read from the sidecar of a folder loaded without
    /// its subfolders. Written back unchanged so the curated order survives.
    pub(crate) detached_sub_group_order: Option<Vec<String>>,
}

impl Group {
    pub(crate) fn empty(path: PathBuf, parent: Option<GroupId>, allowed_thumb_sizes: Vec<ThumbSize>) -> Self {
        let folder_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            folder_name,
            title: String::new(),
            description: String::new(),
            pictures: BTreeMap::new(),
            order: Vec::new(),
            sub_groups: BTreeMap::new(),
            sub_group_order: Vec::new(),
            allowed_thumb_sizes,
            parent,
            detached_sub_group_order: None,
        }
    }

    pub fn has_sub_group(&self, name: &str) -> bool {
        self.sub_groups.contains_key(name)
    }

    pub fn sub_group(&self, name: &str) -> Option<GroupId> {
        self.sub_groups.get(name).copied()
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.pictures.contains_key(name)
    }

    pub fn image(&self, name: &str) -> Option<&Image> {
        self.pictures.get(name)
    }

    pub fn allows_thumb(&self, size: ThumbSize) -> bool {
        self.allowed_thumb_sizes.contains(&size)
    }

    pub(crate) fn sidecar_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE_NAME)
    }

    /// Register a child group, appending it to the display order if new.
    pub(crate) fn attach_sub_group(&mut self, name: String, id: GroupId) {
        if !self.sub_group_order.contains(&name) {
            self.sub_group_order.push(name.clone());
        }
        self.sub_groups.insert(name, id);
    }
}

/// Arena holding every folder of one album tree.
#[derive(Debug, Clone, Default)]
pub struct Album {
    groups: Vec<Group>,
}

impl Album {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The root is always the first group pushed.
    pub fn root(&self) -> GroupId {
        GroupId(0)
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.groups[id.0]
    }

    pub(crate) fn push_group(&mut self, group: Group) -> GroupId {
        self.groups.push(group);
        GroupId(self.groups.len() - 1)
    }

    pub fn image(&self, id: GroupId, name: &str) -> Option<&Image> {
        self.group(id).image(name)
    }

    /// Number of folders in the tree.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
