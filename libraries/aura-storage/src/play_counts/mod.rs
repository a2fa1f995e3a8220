//! Play counts for the "top songs" recap
//!
//! A row is created on a track's first natural completion and incremented on
//! every later one.

use crate::error::Result;
use aura_core::{SongPlayCount, TrackId};
use sqlx::SqlitePool;

/// Record one completed play
pub async fn increment(pool: &SqlitePool, track_id: TrackId) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO song_play_counts (song_id, play_count, last_played_at)
         VALUES (?, 1, ?)
         ON CONFLICT(song_id)
         DO UPDATE SET
            play_count = play_count + 1,
            last_played_at = excluded.last_played_at",
    )
    .bind(track_id.get())
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the play count of a single track
///
/// Returns `Ok(None)` if the track has never completed.
pub async fn get(pool: &SqlitePool, track_id: TrackId) -> Result<Option<SongPlayCount>> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        "SELECT song_id, play_count FROM song_play_counts WHERE song_id = ? LIMIT 1",
    )
    .bind(track_id.get())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(to_play_count))
}

/// Get the most played tracks, highest count first
///
/// Ties are broken by most recent completion, then by track id.
pub async fn top_n(pool: &SqlitePool, limit: usize) -> Result<Vec<SongPlayCount>> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT song_id, play_count FROM song_play_counts
         ORDER BY play_count DESC, last_played_at DESC, song_id ASC
         LIMIT ?",
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(to_play_count).collect())
}

fn to_play_count((song_id, play_count): (i64, i64)) -> SongPlayCount {
    SongPlayCount {
        track_id: TrackId::new(song_id),
        play_count: u32::try_from(play_count).unwrap_or(u32::MAX),
    }
}
