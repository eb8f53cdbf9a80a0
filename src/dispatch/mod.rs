// Dispatch module - maps request paths onto the album tree
mod handlers;
mod resolver;

pub use handlers::{AlbumQuery, album_handler, album_root_handler};
pub use resolver::{Resolution, parse_thumb_name, resolve};
