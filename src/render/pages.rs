//! View models handed to the templates.
//!
//! Pages are composed from small serializable parts; nothing here holds a
//! reference into the album, so a page can outlive the snapshot it came from.

use crate::album::{Album, GroupId, Image, ThumbSize};
use pulldown_cmark::{Parser, html};
use serde::Serialize;
use std::collections::BTreeMap;

/// Site-wide values every page carries.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    pub name: String,
    pub site: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Crumb {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderView {
    pub name: String,
    pub title: String,
    pub description_html: String,
    pub url: String,
    pub is_root: bool,
    pub thumb_width: u32,
    pub thumb_height: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderLink {
    pub name: String,
    pub title: String,
    pub url: String,
    pub current: bool,
    /// First displayed image of the folder, if any.
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageCard {
    pub file_name: String,
    pub title: String,
    pub description_html: String,
    pub url: String,
    pub raw_url: String,
    pub thumbnail_url: String,
    pub accessible: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Navigation {
    pub first: Option<ImageCard>,
    pub previous: Option<ImageCard>,
    pub next: Option<ImageCard>,
    pub last: Option<ImageCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderPage {
    pub site: SiteInfo,
    pub page_title: String,
    pub folder: FolderView,
    pub breadcrumbs: Vec<Crumb>,
    pub siblings: Vec<FolderLink>,
    pub children: Vec<FolderLink>,
    pub images: Vec<ImageCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImagePage {
    pub site: SiteInfo,
    pub page_title: String,
    pub folder: FolderView,
    pub image: ImageCard,
    pub breadcrumbs: Vec<Crumb>,
    pub navigation: Navigation,
}

impl FolderPage {
    pub fn new(album: &Album, id: GroupId, site: &SiteInfo) -> Self {
        let folder = FolderView::new(album, id, site);
        let page_title = folder.title.clone();
        let size = display_size(album, id);

        Self {
            site: site.clone(),
            page_title,
            folder,
            breadcrumbs: breadcrumbs(album, id, site),
            siblings: album
                .siblings(id)
                .into_iter()
                .map(|sibling| FolderLink::new(album, sibling, sibling == id))
                .collect(),
            children: album
                .children(id)
                .into_iter()
                .map(|child| FolderLink::new(album, child, false))
                .collect(),
            images: album
                .visible_images(id)
                .into_iter()
                .map(|image| ImageCard::new(album, image, size))
                .collect(),
        }
    }
}

impl ImagePage {
    /// `None` when `file_name` is not an image of the folder.
    pub fn new(album: &Album, id: GroupId, file_name: &str, site: &SiteInfo) -> Option<Self> {
        let image = album.image(id, file_name)?;
        let size = display_size(album, id);
        let card = ImageCard::new(album, image, size);
        let nav = album.navigation(id, file_name);
        let to_card = |image: Option<&Image>| image.map(|i| ImageCard::new(album, i, size));

        let folder = FolderView::new(album, id, site);
        let page_title = format!("{} - {}", card.title, folder.title);

        Some(Self {
            site: site.clone(),
            page_title,
            folder,
            image: card,
            breadcrumbs: breadcrumbs(album, id, site),
            navigation: Navigation {
                first: to_card(nav.first),
                previous: to_card(nav.previous),
                next: to_card(nav.next),
                last: to_card(nav.last),
            },
        })
    }
}

impl FolderView {
    fn new(album: &Album, id: GroupId, site: &SiteInfo) -> Self {
        let group = album.group(id);
        let is_root = group.parent.is_none();
        let size = display_size(album, id);
        Self {
            name: group.folder_name.clone(),
            title: folder_title(album, id, site),
            description_html: markdown_to_html(&group.description),
            url: album.url_path(id),
            is_root,
            thumb_width: size.width,
            thumb_height: size.height,
        }
    }
}

impl FolderLink {
    fn new(album: &Album, id: GroupId, current: bool) -> Self {
        let group = album.group(id);
        let size = display_size(album, id);
        Self {
            name: group.folder_name.clone(),
            title: non_empty_or(&group.title, &group.folder_name),
            url: album.url_path(id),
            current,
            cover_url: album
                .visible_images(id)
                .first()
                .map(|image| thumbnail_url(album, image, size)),
        }
    }
}

impl ImageCard {
    fn new(album: &Album, image: &Image, size: ThumbSize) -> Self {
        let url = album.image_url(image);
        Self {
            file_name: image.file_name.clone(),
            title: non_empty_or(&image.title, &image.file_name),
            description_html: markdown_to_html(&image.description),
            raw_url: format!("{}?raw=true", url),
            thumbnail_url: thumbnail_url(album, image, size),
            url,
            accessible: image.accessible,
        }
    }
}

fn breadcrumbs(album: &Album, id: GroupId, site: &SiteInfo) -> Vec<Crumb> {
    album
        .ancestors(id)
        .into_iter()
        .map(|ancestor| Crumb {
            title: folder_title(album, ancestor, site),
            url: album.url_path(ancestor),
        })
        .collect()
}

fn folder_title(album: &Album, id: GroupId, site: &SiteInfo) -> String {
    let group = album.group(id);
    if !group.title.is_empty() {
        group.title.clone()
    } else if group.parent.is_none() {
        site.name.clone()
    } else {
        group.folder_name.clone()
    }
}

/// Thumbnails on a page use the first size the folder allows.
fn display_size(album: &Album, id: GroupId) -> ThumbSize {
    album
        .group(id)
        .allowed_thumb_sizes
        .first()
        .copied()
        .unwrap_or(ThumbSize::DEFAULT)
}

fn thumbnail_url(album: &Album, image: &Image, size: ThumbSize) -> String {
    format!("{}{}", album.image_url(image), size.suffix())
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

pub fn markdown_to_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }
    let parser = Parser::new(markdown);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}
