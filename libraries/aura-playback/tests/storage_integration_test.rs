//! End-to-end tests against the SQLite stores
//!
//! The service persists bass strength and play counts through a REAL on-disk
//! database, and a restarted service picks the saved strength back up.

use aura_core::{PlayCountStore, SettingsStore};
use aura_playback::testing::{tracks, FakePlatform};
use aura_playback::{PlaybackDeps, PlaybackHandle, PlaybackService, ServiceConfig};
use aura_storage::Database;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ===== Test Helpers =====

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn open_db(dir: &Path) -> Arc<Database> {
    let url = format!("sqlite://{}", dir.join("aura.db").display());
    Arc::new(Database::new(&url).await.expect("Failed to open database"))
}

fn deps_with(platform: &FakePlatform, db: &Arc<Database>) -> PlaybackDeps {
    PlaybackDeps {
        play_counts: Some(Arc::clone(db) as Arc<dyn PlayCountStore>),
        settings: Some(Arc::clone(db) as Arc<dyn SettingsStore>),
        ..platform.deps()
    }
}

async fn start(platform: &FakePlatform, db: &Arc<Database>) -> PlaybackHandle {
    PlaybackService::spawn(ServiceConfig::default(), deps_with(platform, db))
        .await
        .expect("Failed to start playback service")
}

/// Poll `check` until it holds or two seconds pass
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..40 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

// ===== Tests =====

#[tokio::test]
async fn bass_strength_survives_restart() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    {
        let db = open_db(dir.path()).await;
        let handle = start(&FakePlatform::new(), &db).await;
        assert_eq!(handle.snapshot().effects.bass_strength, 0);

        handle.set_bass_strength(400).unwrap();
        let saved = eventually(|| {
            let db = Arc::clone(&db);
            async move { db.bass_strength().await.ok().flatten() == Some(400) }
        })
        .await;
        assert!(saved, "bass strength was never persisted");

        handle.shutdown().await.unwrap();
    }

    let db = open_db(dir.path()).await;
    let platform = FakePlatform::new();
    let handle = start(&platform, &db).await;
    assert_eq!(handle.snapshot().effects.bass_strength, 400);

    // Reapplied to the first instance built after restart
    handle.set_effect(aura_playback::EffectKind::BassBoost, true).unwrap();
    handle.load_playlist(tracks(&["A"]), 0).unwrap();
    handle.effective_queue().await.unwrap();
    assert_eq!(
        platform
            .effect_log()
            .last_strength(aura_playback::EffectUnit::BassBoost),
        Some(400)
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn completions_feed_top_songs() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let db = open_db(dir.path()).await;
    let platform = FakePlatform::new();
    let handle = start(&platform, &db).await;
    let events = handle.platform_events();

    let playlist = tracks(&["A", "B", "C"]);
    let b = playlist[1].id;
    handle.load_playlist(playlist, 1).unwrap();
    handle.cycle_repeat().unwrap();
    handle.cycle_repeat().unwrap();
    handle.effective_queue().await.unwrap();

    // Repeat one: B completes three times
    for _ in 0..3 {
        let finished = platform.player.finish();
        events.completed(finished).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.effective_queue().await.unwrap();
    }

    let counted = eventually(|| {
        let handle = handle.clone();
        async move {
            handle
                .top_songs()
                .await
                .map(|top| top.first().map(|s| (s.track_id, s.play_count)) == Some((b, 3)))
                .unwrap_or(false)
        }
    })
    .await;
    assert!(counted, "play counts never reached 3");

    let top = handle.top_songs().await.unwrap();
    assert_eq!(top.len(), 1);

    handle.shutdown().await.unwrap();
}
