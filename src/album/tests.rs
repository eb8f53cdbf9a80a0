use super::*;
use crate::thumbnails::{ThumbnailCache, thumbnail_path};
use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_image(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 255) as u8, (y % 255) as u8, 128]));
    img.save(path).unwrap();
}

/// photos/
///   album/ a.jpg b.png notes.txt
///     trip/ c.jpg
fn setup_album() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("photos");
    let album = root.join("album");
    let trip = album.join("trip");
    fs::create_dir_all(&trip).unwrap();

    write_image(&album.join("a.jpg"), 640, 426);
    write_image(&album.join("b.png"), 100, 100);
    fs::write(album.join("notes.txt"), "not a picture").unwrap();
    write_image(&trip.join("c.jpg"), 50, 80);

    (temp_dir, root)
}

fn builder() -> AlbumBuilder {
    AlbumBuilder::new(BuildOptions::default(), ThumbnailCache::new(85))
}

fn builder_without_thumbnails() -> AlbumBuilder {
    AlbumBuilder::new(
        BuildOptions {
            pregenerate_thumbnails: false,
            ..BuildOptions::default()
        },
        ThumbnailCache::new(85),
    )
}

fn find(album: &Album, path: &[&str]) -> GroupId {
    let mut id = album.root();
    for name in path {
        id = album.group(id).sub_group(name).unwrap();
    }
    id
}

fn sidecar(folder: &Path) -> serde_json::Value {
    serde_json::from_slice(&fs::read(folder.join(METADATA_FILE_NAME)).unwrap()).unwrap()
}

#[test]
fn test_build_orders_match_disk() {
    let (_temp_dir, root) = setup_album();
    let album = builder().build(&root, false).unwrap();

    let root_group = album.group(album.root());
    assert!(root_group.order.is_empty());
    assert_eq!(root_group.sub_group_order, vec!["album"]);
    assert!(root_group.parent.is_none());

    let album_id = find(&album, &["album"]);
    let group = album.group(album_id);
    assert_eq!(group.order, vec!["a.jpg", "b.png"]);
    assert_eq!(group.sub_group_order, vec!["trip"]);
    assert_eq!(group.folder_name, "album");
    assert_eq!(group.parent, Some(album.root()));

    let a = group.image("a.jpg").unwrap();
    assert!(a.visible && a.existing && a.accessible);
    assert!(a.title.is_empty() && a.description.is_empty());
    assert_eq!(a.group, album_id);

    let trip = album.group(find(&album, &["album", "trip"]));
    assert_eq!(trip.order, vec!["c.jpg"]);
    assert_eq!(trip.folder_name, "trip");
}

#[test]
fn test_build_writes_sidecars_and_thumbnails() {
    let (_temp_dir, root) = setup_album();
    let album = builder().build(&root, false).unwrap();

    let folder = album.group(find(&album, &["album"])).path.clone();
    let written = sidecar(&folder);
    assert_eq!(written["order"], serde_json::json!(["a.jpg", "b.png"]));
    assert_eq!(written["sub-group-order"], serde_json::json!(["trip"]));
    assert_eq!(
        written["allowed-thumb-sizes"],
        serde_json::json!([{"width": 320, "height": 213}])
    );
    assert_eq!(written["pictures"]["a.jpg"]["file-name"], "a.jpg");

    assert!(thumbnail_path(&folder.join("a.jpg"), ThumbSize::DEFAULT).exists());
    assert!(thumbnail_path(&folder.join("b.png"), ThumbSize::DEFAULT).exists());
    assert!(folder.join("trip").join(METADATA_FILE_NAME).exists());
}

#[test]
fn test_non_recursive_build_ignores_subfolders() {
    let (_temp_dir, root) = setup_album();
    let options = BuildOptions {
        recursive: false,
        pregenerate_thumbnails: false,
        ..BuildOptions::default()
    };
    let album = AlbumBuilder::new(options, ThumbnailCache::new(85))
        .build(&root.join("album"), false)
        .unwrap();

    let group = album.group(album.root());
    assert_eq!(group.order, vec!["a.jpg", "b.png"]);
    assert!(group.sub_group_order.is_empty());
    assert!(group.sub_groups.is_empty());
}

/// Sidecars everywhere, then the trip sidecar removed so any descent into
/// the subfolder would rebuild it.
fn setup_album_without_trip_sidecar() -> (TempDir, PathBuf) {
    let (temp_dir, root) = setup_album();
    builder_without_thumbnails().build(&root, false).unwrap();
    fs::remove_file(root.join("album").join("trip").join(METADATA_FILE_NAME)).unwrap();
    (temp_dir, root)
}

fn top_folder_only() -> AlbumBuilder {
    let options = BuildOptions {
        recursive: false,
        ..BuildOptions::default()
    };
    AlbumBuilder::new(options, ThumbnailCache::new(85))
}

#[test]
fn test_non_recursive_load_leaves_listed_subfolders_alone() {
    let (_temp_dir, root) = setup_album_without_trip_sidecar();
    let folder = root.join("album");
    let trip = folder.join("trip");

    let album = top_folder_only().build(&folder, false).unwrap();

    assert_eq!(album.len(), 1);
    let group = album.group(album.root());
    assert_eq!(group.order, vec!["a.jpg", "b.png"]);
    assert!(group.sub_groups.is_empty());
    assert!(group.sub_group_order.is_empty());

    assert!(!trip.join(METADATA_FILE_NAME).exists());
    assert!(!thumbnail_path(&trip.join("c.jpg"), ThumbSize::DEFAULT).exists());
    assert_eq!(sidecar(&folder)["sub-group-order"], serde_json::json!(["trip"]));
}

#[test]
fn test_non_recursive_update_keeps_subfolder_order() {
    let (_temp_dir, root) = setup_album_without_trip_sidecar();
    let folder = root.join("album");
    let trip = folder.join("trip");
    write_image(&folder.join("d.jpg"), 40, 40);

    let album = top_folder_only().build(&folder, true).unwrap();

    assert_eq!(album.len(), 1);
    let group = album.group(album.root());
    assert_eq!(group.order, vec!["a.jpg", "b.png", "d.jpg"]);
    assert!(group.sub_groups.is_empty());
    assert!(thumbnail_path(&folder.join("d.jpg"), ThumbSize::DEFAULT).exists());

    let doc = sidecar(&folder);
    assert_eq!(doc["order"], serde_json::json!(["a.jpg", "b.png", "d.jpg"]));
    assert_eq!(doc["sub-group-order"], serde_json::json!(["trip"]));

    assert!(!trip.join(METADATA_FILE_NAME).exists());
    assert!(!thumbnail_path(&trip.join("c.jpg"), ThumbSize::DEFAULT).exists());
}

#[test]
fn test_reload_keeps_curator_edits_and_order() {
    let (_temp_dir, root) = setup_album();
    builder_without_thumbnails().build(&root, false).unwrap();

    // A curator reorders and annotates the folder by hand.
    let folder = root.join("album");
    let mut doc = sidecar(&folder);
    doc["title"] = "Album".into();
    doc["order"] = serde_json::json!(["b.png", "a.jpg"]);
    doc["pictures"]["a.jpg"]["title"] = "Sunset".into();
    doc["pictures"]["a.jpg"]["visible"] = false.into();
    fs::write(folder.join(METADATA_FILE_NAME), serde_json::to_vec(&doc).unwrap()).unwrap();

    let album = builder_without_thumbnails().build(&root, true).unwrap();
    let group = album.group(find(&album, &["album"]));
    assert_eq!(group.title, "Album");
    assert_eq!(group.order, vec!["b.png", "a.jpg"]);
    let a = group.image("a.jpg").unwrap();
    assert_eq!(a.title, "Sunset");
    assert!(!a.visible);
    assert!(a.existing);
}

#[test]
fn test_empty_sidecar_loads_as_empty_group() {
    let temp_dir = TempDir::new().unwrap();
    write_image(&temp_dir.path().join("a.jpg"), 10, 10);
    fs::write(temp_dir.path().join(METADATA_FILE_NAME), "").unwrap();

    let album = builder_without_thumbnails().build(temp_dir.path(), false).unwrap();
    let group = album.group(album.root());
    assert!(group.pictures.is_empty());
    assert!(group.order.is_empty());
    assert_eq!(group.allowed_thumb_sizes, vec![ThumbSize::DEFAULT]);
}

#[test]
fn test_malformed_sidecar_is_fatal_for_the_load() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(METADATA_FILE_NAME), "{ broken").unwrap();

    match builder_without_thumbnails().build(temp_dir.path(), false) {
        Err(AlbumError::Sidecar { path, .. }) => {
            assert!(path.ends_with(METADATA_FILE_NAME));
        }
        other => panic!("expected sidecar error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_thumb_sizes_are_inherited_top_down() {
    let (_temp_dir, root) = setup_album();
    let custom = serde_json::json!({
        "sub-group-order": ["album"],
        "allowed-thumb-sizes": [{"width": 100, "height": 100}, {"width": 640, "height": 480}]
    });
    fs::write(root.join(METADATA_FILE_NAME), custom.to_string()).unwrap();

    let album = builder_without_thumbnails().build(&root, false).unwrap();
    let expected = vec![ThumbSize::new(100, 100), ThumbSize::new(640, 480)];
    assert_eq!(album.group(album.root()).allowed_thumb_sizes, expected);
    assert_eq!(album.group(find(&album, &["album"])).allowed_thumb_sizes, expected);
    assert_eq!(
        album.group(find(&album, &["album", "trip"])).allowed_thumb_sizes,
        expected
    );
}

#[test]
fn test_reconcile_is_idempotent() {
    let (_temp_dir, root) = setup_album();
    let builder = builder_without_thumbnails();
    let mut album = builder.build(&root, false).unwrap();
    let root_id = album.root();

    builder.reconcile(&mut album, root_id, true).unwrap();
    let first = album.clone();
    builder.reconcile(&mut album, root_id, true).unwrap();

    for path in [&[][..], &["album"][..], &["album", "trip"][..]] {
        let before = first.group(find(&first, path));
        let after = album.group(find(&album, path));
        assert_eq!(before.order, after.order);
        assert_eq!(before.sub_group_order, after.sub_group_order);
        assert_eq!(before.pictures, after.pictures);
    }
}

#[test]
fn test_soft_delete_and_restore() {
    let (_temp_dir, root) = setup_album();
    let builder = builder_without_thumbnails();
    let mut album = builder.build(&root, false).unwrap();
    let album_id = find(&album, &["album"]);
    let a_path = root.join("album").join("a.jpg");
    let parked = root.join("a.jpg.parked");

    fs::rename(&a_path, &parked).unwrap();
    builder.reconcile(&mut album, album_id, true).unwrap();
    {
        let group = album.group(album_id);
        let a = group.image("a.jpg").unwrap();
        assert!(!a.existing);
        assert_eq!(group.order, vec!["a.jpg", "b.png"]);
        assert!(album.visible_images(album_id).iter().all(|i| i.file_name != "a.jpg"));
    }
    assert_eq!(
        sidecar(&root.join("album"))["pictures"]["a.jpg"]["existing"],
        serde_json::json!(false)
    );

    fs::rename(&parked, &a_path).unwrap();
    builder.reconcile(&mut album, album_id, true).unwrap();
    let group = album.group(album_id);
    assert!(group.image("a.jpg").unwrap().existing);
    assert_eq!(group.order, vec!["a.jpg", "b.png"]);
}

#[test]
fn test_reconcile_appends_new_entries_and_drops_vanished_folders() {
    let (_temp_dir, root) = setup_album();
    let builder = builder_without_thumbnails();
    let mut album = builder.build(&root, false).unwrap();
    let album_id = find(&album, &["album"]);
    let folder = root.join("album");

    // Renamed file: old name soft-deleted, new name appended.
    fs::rename(folder.join("a.jpg"), folder.join("a2.jpg")).unwrap();
    fs::remove_dir_all(folder.join("trip")).unwrap();
    fs::create_dir(folder.join("beach")).unwrap();
    write_image(&folder.join("beach").join("d.gif"), 20, 20);

    builder.reconcile(&mut album, album_id, true).unwrap();
    let group = album.group(album_id);
    assert_eq!(group.order, vec!["a.jpg", "b.png", "a2.jpg"]);
    assert!(!group.image("a.jpg").unwrap().existing);
    assert!(group.image("a2.jpg").unwrap().existing);
    assert_eq!(group.sub_group_order, vec!["beach"]);
    assert!(!group.has_sub_group("trip"));

    let beach = album.group(group.sub_group("beach").unwrap());
    assert_eq!(beach.order, vec!["d.gif"]);
    assert_eq!(beach.parent, Some(album_id));
}

#[test]
fn test_update_build_drops_vanished_folder_from_sidecar_order() {
    let (_temp_dir, root) = setup_album();
    builder_without_thumbnails().build(&root, false).unwrap();
    fs::remove_dir_all(root.join("album").join("trip")).unwrap();

    let album = builder_without_thumbnails().build(&root, true).unwrap();
    assert!(album.group(find(&album, &["album"])).sub_group_order.is_empty());
    assert_eq!(
        sidecar(&root.join("album"))["sub-group-order"],
        serde_json::json!([])
    );
}

#[test]
fn test_consistency_violation_is_distinct() {
    let mut group = Group::empty(PathBuf::from("/x"), None, vec![ThumbSize::DEFAULT]);
    let err = reconcile::confirm_rediscovered(&mut group, &["ghost.jpg".to_string()]).unwrap_err();
    assert!(err.is_consistency());
    assert!(err.to_string().contains("ghost.jpg"));
}

#[test]
fn test_corrupt_image_does_not_abort_build() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("broken.jpg"), b"definitely not a jpeg").unwrap();
    write_image(&temp_dir.path().join("ok.png"), 400, 400);

    let album = builder().build(temp_dir.path(), false).unwrap();
    let group = album.group(album.root());
    assert_eq!(group.order, vec!["broken.jpg", "ok.png"]);
    assert!(!group.image("broken.jpg").unwrap().accessible);
    assert!(group.image("ok.png").unwrap().accessible);
    assert!(!thumbnail_path(&temp_dir.path().join("broken.jpg"), ThumbSize::DEFAULT).exists());
}

#[test]
fn test_navigation_helpers() {
    let (_temp_dir, root) = setup_album();
    let album = builder_without_thumbnails().build(&root, false).unwrap();
    let album_id = find(&album, &["album"]);
    let trip_id = find(&album, &["album", "trip"]);

    assert_eq!(album.ancestors(trip_id), vec![album.root(), album_id, trip_id]);
    assert_eq!(album.children(album_id), vec![trip_id]);
    assert_eq!(album.siblings(trip_id), vec![trip_id]);
    assert!(album.siblings(album.root()).is_empty());
    assert_eq!(album.url_path(trip_id), "/album/trip");
    assert_eq!(album.url_path(album.root()), "/");

    let nav = album.navigation(album_id, "b.png");
    assert_eq!(nav.first.unwrap().file_name, "a.jpg");
    assert_eq!(nav.previous.unwrap().file_name, "a.jpg");
    assert!(nav.next.is_none());
    assert_eq!(nav.last.unwrap().file_name, "b.png");

    let a = album.image(album_id, "a.jpg").unwrap();
    assert_eq!(album.image_url(a), "/album/a.jpg");
}
