//! Read-only traversal helpers used by the theme layer.

use super::{Album, GroupId, Image};

/// Neighbours of an image among the displayed images of its folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNavigation<'a> {
    pub first: Option<&'a Image>,
    pub previous: Option<&'a Image>,
    pub next: Option<&'a Image>,
    pub last: Option<&'a Image>,
}

impl Album {
    /// Groups from the root down to `id`, both included.
    pub fn ancestors(&self, id: GroupId) -> Vec<GroupId> {
        let mut chain = vec![id];
        let mut current = self.group(id).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.group(parent).parent;
        }
        chain.reverse();
        chain
    }

    /// Folders sharing `id`'s parent, in display order, `id` included.
    /// The root has no siblings.
    pub fn siblings(&self, id: GroupId) -> Vec<GroupId> {
        match self.group(id).parent {
            Some(parent) => self.children(parent),
            None => Vec::new(),
        }
    }

    pub fn children(&self, id: GroupId) -> Vec<GroupId> {
        let group = self.group(id);
        group
            .sub_group_order
            .iter()
            .filter_map(|name| group.sub_group(name))
            .collect()
    }

    /// Images that are both visible and present on disk, in display order.
    pub fn visible_images(&self, id: GroupId) -> Vec<&Image> {
        let group = self.group(id);
        group
            .order
            .iter()
            .filter_map(|name| group.image(name))
            .filter(|image| image.is_displayed())
            .collect()
    }

    pub fn navigation(&self, id: GroupId, file_name: &str) -> ImageNavigation<'_> {
        let images = self.visible_images(id);
        let position = images.iter().position(|image| image.file_name == file_name);

        ImageNavigation {
            first: images.first().copied(),
            previous: position
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| images.get(index).copied()),
            next: position.and_then(|index| images.get(index + 1).copied()),
            last: images.last().copied(),
        }
    }

    /// URL path of a folder, `/` for the root.
    pub fn url_path(&self, id: GroupId) -> String {
        let segments: Vec<String> = self
            .ancestors(id)
            .into_iter()
            .skip(1)
            .map(|ancestor| urlencoding::encode(&self.group(ancestor).folder_name).into_owned())
            .collect();
        format!("/{}", segments.join("/"))
    }

    pub fn image_url(&self, image: &Image) -> String {
        let folder = self.url_path(image.group);
        let name = urlencoding::encode(&image.file_name);
        if folder == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", folder, name)
        }
    }
}
