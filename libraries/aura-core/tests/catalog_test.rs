//! Catalog behavior through the `TrackCatalog` trait object

use aura_core::{
    AlbumId, CatalogEntry, ContentHandle, FolderFilter, LibraryCatalog, Track, TrackCatalog,
    TrackId,
};
use std::sync::Arc;

fn track(id: i64, title: &str) -> Track {
    Track::new(
        TrackId::new(id),
        title,
        "Test Artist",
        AlbumId::new(id * 10),
        200_000,
        ContentHandle::new(format!("content://media/external/audio/media/{}", id)),
    )
}

#[tokio::test]
async fn list_tracks_through_trait_object() {
    let mut catalog = LibraryCatalog::default();
    catalog.insert(CatalogEntry::music(track(1, "Weightless"), "AURA_Music/w.mp3"));
    catalog.insert(CatalogEntry::music(track(2, "Clair de Lune"), "AURA_Music/c.flac"));
    catalog.insert(CatalogEntry::music(track(3, "Notification"), "Notifications/n.ogg"));

    let catalog: Arc<dyn TrackCatalog> = Arc::new(catalog);
    let tracks = catalog
        .list_tracks(&FolderFilter::new("AURA_Music"))
        .await
        .expect("in-memory catalog never fails");

    let ids: Vec<i64> = tracks.iter().map(|t| t.id.get()).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn unmatched_folder_is_empty_not_error() {
    let catalog = LibraryCatalog::new(vec![CatalogEntry::music(
        track(1, "Song"),
        "Music/song.mp3",
    )]);

    let tracks = catalog
        .list_tracks(&FolderFilter::default())
        .await
        .expect("empty result is not an error");
    assert!(tracks.is_empty());
}
