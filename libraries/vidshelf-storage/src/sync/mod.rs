//! Channel playlist synchronization
//!
//! Mirrors playlists published by a channel on the external platform into
//! local system playlists (`source_type = 'channel'`). These are the only
//! writers allowed to change a read-only playlist's membership.

use crate::{playlists, videos};
use chrono::Utc;
use sqlx::SqliteConnection;
use std::collections::HashSet;
use vidshelf_core::{
    error::Result, ordering::dedup_first, ChannelPlaylistSnapshot, PlaylistId, SourceType,
    VidshelfError,
};

/// What happened to one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// None of the snapshot's videos are known locally for this channel
    Skipped,
    Created(PlaylistId),
    Updated(PlaylistId),
}

/// Totals for one channel sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub deactivated: u64,
}

/// Create or refresh the local mirror of one channel playlist.
///
/// Only videos that exist locally and belong to the snapshot's channel are
/// kept, in snapshot order with repeats dropped. The cursor is re-clamped
/// against the new length.
pub async fn upsert_channel_playlist(
    conn: &mut SqliteConnection,
    snapshot: &ChannelPlaylistSnapshot,
) -> Result<SyncOutcome> {
    if snapshot.external_playlist_id.trim().is_empty() {
        return Err(VidshelfError::invalid_input(
            "external playlist id must not be empty",
        ));
    }

    let owned = videos::owned_by_channel(conn, &snapshot.channel_id, &snapshot.video_ids).await?;
    let video_ids: Vec<_> = dedup_first(&snapshot.video_ids)
        .into_iter()
        .filter(|id| owned.contains(id))
        .collect();

    if video_ids.is_empty() {
        tracing::debug!(
            channel_id = %snapshot.channel_id,
            external_playlist_id = %snapshot.external_playlist_id,
            "No local videos for channel playlist, skipping"
        );
        return Ok(SyncOutcome::Skipped);
    }

    let name = snapshot.name.trim();
    let name = if name.is_empty() {
        snapshot.external_playlist_id.as_str()
    } else {
        name
    };
    let now = Utc::now();

    let existing =
        playlists::find_by_source(conn, SourceType::Channel, &snapshot.external_playlist_id)
            .await?;

    let (playlist_id, created) = if let Some(playlist) = existing {
        sqlx::query(
            r#"
            UPDATE playlists
            SET name = ?, description = ?, source_channel_id = ?,
                source_is_active = 1, source_last_synced_at = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(&snapshot.description)
        .bind(&snapshot.channel_id)
        .bind(now)
        .bind(&playlist.id)
        .execute(&mut *conn)
        .await?;
        (playlist.id, false)
    } else {
        let id = PlaylistId::generate();
        sqlx::query(
            r#"
            INSERT INTO playlists (
                id, name, description, is_system, source_type, source_channel_id,
                source_external_id, source_is_active, source_last_synced_at, created_at
            )
            VALUES (?, ?, ?, 1, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(&snapshot.description)
        .bind(SourceType::Channel.as_str())
        .bind(&snapshot.channel_id)
        .bind(&snapshot.external_playlist_id)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        (id, true)
    };

    playlists::ordering::set(conn, &playlist_id, &video_ids).await?;
    let mut cursor = playlists::cursor::load(conn, &playlist_id).await?;
    cursor.on_set(video_ids.len());
    playlists::cursor::store(conn, &playlist_id, cursor).await?;

    tracing::info!(
        playlist_id = %playlist_id,
        channel_id = %snapshot.channel_id,
        videos = video_ids.len(),
        created,
        "Synced channel playlist"
    );

    Ok(if created {
        SyncOutcome::Created(playlist_id)
    } else {
        SyncOutcome::Updated(playlist_id)
    })
}

/// Mark the channel's mirrored playlists whose external id is not in
/// `seen` as inactive. Returns how many were flipped.
pub async fn deactivate_missing(
    conn: &mut SqliteConnection,
    channel_id: &str,
    seen: &HashSet<String>,
) -> Result<u64> {
    let active: Vec<(PlaylistId, String)> = sqlx::query_as(
        r#"
        SELECT id, source_external_id FROM playlists
        WHERE source_type = ? AND source_channel_id = ? AND source_is_active = 1
          AND source_external_id IS NOT NULL
        "#,
    )
    .bind(SourceType::Channel.as_str())
    .bind(channel_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut deactivated = 0;
    for (id, external_id) in active {
        if seen.contains(&external_id) {
            continue;
        }
        sqlx::query("UPDATE playlists SET source_is_active = 0 WHERE id = ?")
            .bind(&id)
            .execute(&mut *conn)
            .await?;
        tracing::info!(playlist_id = %id, external_id = %external_id, "Deactivated channel playlist");
        deactivated += 1;
    }

    Ok(deactivated)
}
