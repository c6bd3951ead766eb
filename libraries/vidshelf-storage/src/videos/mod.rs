//! Videos vertical slice
//!
//! The library only keeps a thin reference per video (id, channel, title);
//! ingestion from the external platform lives elsewhere. This slice also
//! provides the `SQLite` implementation of [`VideoDirectory`].

use crate::{playlists, BATCH_SIZE};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashSet;
use vidshelf_core::{
    error::Result, PlaylistId, RegisterVideo, Video, VideoDirectory, VideoId, VidshelfError,
};

/// Video directory backed by the `videos` table
#[derive(Clone)]
pub struct SqliteVideoDirectory {
    pool: SqlitePool,
}

impl SqliteVideoDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoDirectory for SqliteVideoDirectory {
    async fn exists_all(&self, ids: &[VideoId]) -> Result<HashSet<VideoId>> {
        let mut conn = self.pool.acquire().await?;
        existing_ids(&mut conn, ids).await
    }
}

/// Subset of `ids` present in the `videos` table
pub async fn existing_ids(conn: &mut SqliteConnection, ids: &[VideoId]) -> Result<HashSet<VideoId>> {
    let mut found = HashSet::with_capacity(ids.len());

    for chunk in ids.chunks(BATCH_SIZE) {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id FROM videos WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in chunk {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let rows: Vec<VideoId> = query.build_query_scalar().fetch_all(&mut *conn).await?;
        found.extend(rows);
    }

    Ok(found)
}

/// Subset of `ids` that exist and were published by `channel_id`
pub async fn owned_by_channel(
    conn: &mut SqliteConnection,
    channel_id: &str,
    ids: &[VideoId],
) -> Result<HashSet<VideoId>> {
    let mut found = HashSet::with_capacity(ids.len());

    for chunk in ids.chunks(BATCH_SIZE) {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id FROM videos WHERE channel_id = ");
        query.push_bind(channel_id.to_string());
        query.push(" AND id IN (");
        let mut separated = query.separated(", ");
        for id in chunk {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let rows: Vec<VideoId> = query.build_query_scalar().fetch_all(&mut *conn).await?;
        found.extend(rows);
    }

    Ok(found)
}

/// Insert a video reference, or refresh channel and title if it exists
pub async fn upsert(conn: &mut SqliteConnection, video: RegisterVideo) -> Result<Video> {
    if video.id.as_str().trim().is_empty() {
        return Err(VidshelfError::invalid_input("video id must not be empty"));
    }

    sqlx::query(
        r#"
        INSERT INTO videos (id, channel_id, title, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            channel_id = excluded.channel_id,
            title = excluded.title
        "#,
    )
    .bind(&video.id)
    .bind(&video.channel_id)
    .bind(&video.title)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    get(conn, &video.id)
        .await?
        .ok_or_else(|| VidshelfError::Database(format!("video {} vanished after upsert", video.id)))
}

/// Get video by ID
pub async fn get(conn: &mut SqliteConnection, id: &VideoId) -> Result<Option<Video>> {
    let row = sqlx::query("SELECT id, channel_id, title, created_at FROM videos WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(Video {
        id: row.try_get("id")?,
        channel_id: row.try_get("channel_id")?,
        title: row.try_get("title")?,
        created_at: row.try_get("created_at")?,
    }))
}

/// Playlists that contain `id`, ordered by playlist id
pub async fn holders(conn: &mut SqliteConnection, id: &VideoId) -> Result<Vec<PlaylistId>> {
    let holders = sqlx::query_scalar(
        "SELECT playlist_id FROM playlist_videos WHERE video_id = ? ORDER BY playlist_id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(holders)
}

/// Delete a video.
///
/// Every playlist holding it is compacted and has its cursor adjusted as
/// for a `remove`, before the row (and its memberships) go away. Returns
/// false if the video did not exist.
pub async fn delete(conn: &mut SqliteConnection, id: &VideoId) -> Result<bool> {
    let holders = holders(conn, id).await?;

    for playlist_id in &holders {
        let Some(removed) = playlists::ordering::remove(conn, playlist_id, id).await? else {
            continue;
        };
        let remaining = playlists::positions::count(conn, playlist_id).await?;
        let mut cursor = playlists::cursor::load(conn, playlist_id).await?;
        cursor.on_remove(removed, remaining);
        playlists::cursor::store(conn, playlist_id, cursor).await?;
    }

    let result = sqlx::query("DELETE FROM videos WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::info!(video_id = %id, playlists = holders.len(), "Deleted video");
    }
    Ok(deleted)
}
