//! JSON sidecar codec.
//!
//! Each folder keeps its curator metadata in `metadata.json`. Disk paths and
//! tree links are not authoritative in the file; they are re-derived from
//! where the sidecar was found when it is loaded.

use super::{AlbumError, Group, GroupId, Image, METADATA_FILE_NAME, ThumbSize};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidecarDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pictures: BTreeMap<String, PictureEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: Vec<String>,
    #[serde(
        rename = "sub-group-order",
        default,
        deserialize_with = "null_as_default"
    )]
    pub sub_group_order: Vec<String>,
    #[serde(rename = "allowed-thumb-sizes", default)]
    pub allowed_thumb_sizes: Option<Vec<ThumbSize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureEntry {
    #[serde(default)]
    pub path: PathBuf,
    #[serde(rename = "file-name", default)]
    pub file_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub existing: bool,
    #[serde(default = "default_true")]
    pub accessible: bool,
}

fn default_true() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SidecarDocument {
    pub fn from_group(group: &Group) -> Self {
        let pictures = group
            .pictures
            .iter()
            .map(|(name, image)| {
                (
                    name.clone(),
                    PictureEntry {
                        path: image.path.clone(),
                        file_name: image.file_name.clone(),
                        title: image.title.clone(),
                        description: image.description.clone(),
                        visible: image.visible,
                        existing: image.existing,
                        accessible: image.accessible,
                    },
                )
            })
            .collect();

        Self {
            title: group.title.clone(),
            description: group.description.clone(),
            pictures,
            order: group.order.clone(),
            sub_group_order: group
                .detached_sub_group_order
                .clone()
                .unwrap_or_else(|| group.sub_group_order.clone()),
            allowed_thumb_sizes: Some(group.allowed_thumb_sizes.clone()),
        }
    }

    /// Build the in-memory group for the folder at `path`.
    ///
    /// Subfolder entries are kept only in the order; the caller decides
    /// which of them to load. Images come back attached to `id`.
    pub(crate) fn into_group(
        self,
        path: PathBuf,
        parent: Option<GroupId>,
        inherited_sizes: &[ThumbSize],
        id: GroupId,
    ) -> Group {
        let allowed_thumb_sizes = match self.allowed_thumb_sizes {
            Some(sizes) if !sizes.is_empty() => sizes,
            _ => inherited_sizes.to_vec(),
        };

        let mut group = Group::empty(path, parent, allowed_thumb_sizes);
        group.title = self.title;
        group.description = self.description;
        group.pictures = self
            .pictures
            .into_iter()
            .map(|(name, entry)| {
                let image = Image {
                    path: entry.path,
                    file_name: name.clone(),
                    title: entry.title,
                    description: entry.description,
                    visible: entry.visible,
                    existing: entry.existing,
                    accessible: entry.accessible,
                    group: id,
                };
                (name, image)
            })
            .collect();
        group.order = normalized_order(self.order, &group.pictures);
        group.sub_group_order = dedup(self.sub_group_order);
        reattach_images(&mut group, id);
        group
    }
}

/// Point every image back at its owning group and recompute its disk path.
pub(crate) fn reattach_images(group: &mut Group, id: GroupId) {
    let folder = group.path.clone();
    for (name, image) in group.pictures.iter_mut() {
        image.group = id;
        image.path = folder.join(name);
    }
}

/// Keep the order a permutation of the picture keys: dangling and repeated
/// names are dropped, unordered pictures are appended.
fn normalized_order(order: Vec<String>, pictures: &BTreeMap<String, Image>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized: Vec<String> = order
        .into_iter()
        .filter(|name| pictures.contains_key(name) && seen.insert(name.clone()))
        .collect();
    for name in pictures.keys() {
        if !seen.contains(name) {
            debug!("Picture {} missing from order, appending", name);
            normalized.push(name.clone());
        }
    }
    normalized
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

pub fn encode(group: &Group) -> Result<Vec<u8>, serde_json::Error> {
    let document = SidecarDocument::from_group(group);
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document.serialize(&mut serializer)?;
    Ok(out)
}

/// Empty input is a freshly created sidecar and decodes to an empty document.
pub fn decode(bytes: &[u8]) -> Result<SidecarDocument, serde_json::Error> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(SidecarDocument::default());
    }
    serde_json::from_slice(bytes)
}

/// Read the sidecar of `folder`, `None` when the folder has none yet.
pub(crate) fn read_sidecar(folder: &Path) -> Result<Option<SidecarDocument>, AlbumError> {
    let path = folder.join(METADATA_FILE_NAME);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AlbumError::io(&path)(e)),
    };
    decode(&bytes)
        .map(Some)
        .map_err(|source| AlbumError::Sidecar { path, source })
}

pub(crate) fn write_sidecar(group: &Group) -> Result<(), AlbumError> {
    let path = group.sidecar_path();
    let bytes = encode(group).map_err(|source| AlbumError::Sidecar {
        path: path.clone(),
        source,
    })?;
    debug!("Writing metadata to {:?}", path);
    std::fs::write(&path, bytes).map_err(AlbumError::io(&path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> Group {
        let id = GroupId(0);
        let mut group = Group::empty(PathBuf::from("/photos/trip"), None, vec![ThumbSize::DEFAULT]);
        group.title = "Trip".to_string();
        group.description = "Summer *2019*".to_string();
        for (name, visible, existing) in [("b.png", true, true), ("a.jpg", false, false)] {
            let mut image = Image::discovered(group.path.join(name), name.to_string(), true, id);
            image.visible = visible;
            image.existing = existing;
            image.title = format!("title of {}", name);
            group.pictures.insert(name.to_string(), image);
            group.order.push(name.to_string());
        }
        group.sub_group_order = vec!["day2".to_string(), "day1".to_string()];
        group
    }

    #[test]
    fn test_empty_input_decodes_to_empty_document() {
        assert_eq!(decode(b"").unwrap(), SidecarDocument::default());
        assert_eq!(decode(b"  \n").unwrap(), SidecarDocument::default());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(decode(b"{ not json").is_err());
    }

    #[test]
    fn test_encoded_field_names() {
        let text = String::from_utf8(encode(&sample_group()).unwrap()).unwrap();
        for field in [
            "\"title\"",
            "\"description\"",
            "\"pictures\"",
            "\"order\"",
            "\"sub-group-order\"",
            "\"allowed-thumb-sizes\"",
            "\"file-name\"",
            "\"visible\"",
            "\"existing\"",
            "\"accessible\"",
        ] {
            assert!(text.contains(field), "missing {} in {}", field, text);
        }
        // 4-space indentation
        assert!(text.contains("\n    \"title\""));
    }

    #[test]
    fn test_round_trip_keeps_curator_fields_and_orders() {
        let group = sample_group();
        let bytes = encode(&group).unwrap();
        let restored = decode(&bytes)
            .unwrap()
            .into_group(group.path.clone(), None, &[], GroupId(0));

        assert_eq!(restored.title, group.title);
        assert_eq!(restored.description, group.description);
        assert_eq!(restored.order, vec!["b.png", "a.jpg"]);
        assert_eq!(restored.sub_group_order, vec!["day2", "day1"]);
        assert_eq!(restored.pictures, group.pictures);
        assert_eq!(restored.allowed_thumb_sizes, vec![ThumbSize::DEFAULT]);
    }

    #[test]
    fn test_null_collections_and_missing_sizes_inherit() {
        let json = br#"{"title": "x", "pictures": null, "order": null, "sub-group-order": null}"#;
        let group = decode(json).unwrap().into_group(
            PathBuf::from("/a"),
            Some(GroupId(0)),
            &[ThumbSize::new(100, 100)],
            GroupId(1),
        );
        assert!(group.pictures.is_empty());
        assert!(group.order.is_empty());
        assert_eq!(group.allowed_thumb_sizes, vec![ThumbSize::new(100, 100)]);
        assert_eq!(group.parent, Some(GroupId(0)));
    }

    #[test]
    fn test_order_is_normalized_against_pictures() {
        let json = br#"{
            "pictures": {
                "a.jpg": {"path": "/old/place/a.jpg", "file-name": "a.jpg", "title": "A"},
                "b.jpg": {"file-name": "b.jpg"}
            },
            "order": ["ghost.jpg", "b.jpg", "b.jpg"]
        }"#;
        let group = decode(json)
            .unwrap()
            .into_group(PathBuf::from("/new"), None, &[], GroupId(3));

        assert_eq!(group.order, vec!["b.jpg", "a.jpg"]);
        let a = group.image("a.jpg").unwrap();
        assert_eq!(a.path, PathBuf::from("/new/a.jpg"));
        assert_eq!(a.group, GroupId(3));
        assert!(a.visible && a.existing && a.accessible);
    }
}
