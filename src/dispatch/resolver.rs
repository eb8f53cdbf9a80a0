use crate::album::{Album, GroupId, ThumbSize};

/// What a request path designates within the album tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Folder(GroupId),
    ImagePage { group: GroupId, file_name: String },
    RawImage { group: GroupId, file_name: String },
    Thumbnail { group: GroupId, file_name: String, size: ThumbSize },
    /// The thumbnail size is not whitelisted for the folder.
    Forbidden,
    NotFound,
}

/// Walk `path` through the in-memory tree, starting at the root.
///
/// Empty components are ignored. Image and thumbnail names end the walk;
/// anything after them does not resolve.
pub fn resolve(album: &Album, path: &str, raw: bool) -> Resolution {
    let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();
    let mut current = album.root();

    while let Some(component) = components.next() {
        let group = album.group(current);
        let last = components.peek().is_none();

        if let Some(child) = group.sub_group(component) {
            current = child;
            continue;
        }

        if group.has_image(component) {
            if !last {
                return Resolution::NotFound;
            }
            let file_name = component.to_string();
            return if raw {
                Resolution::RawImage {
                    group: current,
                    file_name,
                }
            } else {
                Resolution::ImagePage {
                    group: current,
                    file_name,
                }
            };
        }

        if let Some((file_name, size)) = parse_thumb_name(component) {
            if !group.allows_thumb(size) {
                return Resolution::Forbidden;
            }
            if !last || !group.has_image(file_name) {
                return Resolution::NotFound;
            }
            return Resolution::Thumbnail {
                group: current,
                file_name: file_name.to_string(),
                size,
            };
        }

        return Resolution::NotFound;
    }

    Resolution::Folder(current)
}

/// Split `<file>_<w>_x_<h>` into the image name and size.
pub fn parse_thumb_name(component: &str) -> Option<(&str, ThumbSize)> {
    let (rest, height) = component.rsplit_once("_x_")?;
    let (file_name, width) = rest.rsplit_once('_')?;
    if file_name.is_empty() || !is_decimal(width) || !is_decimal(height) {
        return None;
    }
    let size = ThumbSize::new(width.parse().ok()?, height.parse().ok()?);
    Some((file_name, size))
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
