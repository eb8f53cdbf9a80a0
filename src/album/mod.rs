// Album module - folder tree, sidecar metadata and reconciliation
mod builder;
mod error;
pub mod metadata;
mod reconcile;
mod store;
mod types;
mod view;
mod walk;

pub use builder::{AlbumBuilder, BuildOptions};
pub use error::AlbumError;
pub use store::{AlbumStore, SharedAlbum};
pub use types::*;
pub use view::ImageNavigation;

#[cfg(test)]
mod tests;
