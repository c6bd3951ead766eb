//! Position store
//!
//! Row-level primitives over `playlist_videos`. Each playlist keeps its
//! positions dense (`0..n`) and `(playlist_id, position)` is UNIQUE, which
//! SQLite checks row by row during an UPDATE. Every range shift therefore
//! goes through [`shift_range`], which parks the affected rows on distinct
//! negative slots before writing their final positions.

use crate::BATCH_SIZE;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashSet;
use vidshelf_core::{error::Result, PlaylistId, VideoId};

/// Member video ids by ascending position
pub async fn ordered_video_ids(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
) -> Result<Vec<VideoId>> {
    let ids: Vec<VideoId> = sqlx::query_scalar(
        "SELECT video_id FROM playlist_videos WHERE playlist_id = ? ORDER BY position ASC",
    )
    .bind(playlist_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}

/// Raw positions by ascending order (for invariant checks)
pub async fn positions(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<Vec<i64>> {
    let positions: Vec<i64> = sqlx::query_scalar(
        "SELECT position FROM playlist_videos WHERE playlist_id = ? ORDER BY position ASC",
    )
    .bind(playlist_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(positions)
}

/// Number of members
pub async fn count(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<usize> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM playlist_videos WHERE playlist_id = ?")
            .bind(playlist_id)
            .fetch_one(&mut *conn)
            .await?;

    Ok(count as usize)
}

/// Highest position, or -1 for an empty playlist
pub async fn max_position(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<i64> {
    let max: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), -1) FROM playlist_videos WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(max)
}

/// Position of one member, `None` if the video is not in the playlist
pub async fn position_of(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_id: &VideoId,
) -> Result<Option<i64>> {
    let position: Option<i64> = sqlx::query_scalar(
        "SELECT position FROM playlist_videos WHERE playlist_id = ? AND video_id = ?",
    )
    .bind(playlist_id)
    .bind(video_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(position)
}

/// Which of `video_ids` are already members
pub async fn members_among(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_ids: &[VideoId],
) -> Result<HashSet<VideoId>> {
    let mut members = HashSet::new();

    for chunk in video_ids.chunks(BATCH_SIZE) {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT video_id FROM playlist_videos WHERE playlist_id = ");
        query.push_bind(playlist_id.clone());
        query.push(" AND video_id IN (");
        let mut separated = query.separated(", ");
        for video_id in chunk {
            separated.push_bind(video_id.clone());
        }
        separated.push_unseparated(")");

        let found: Vec<VideoId> = query
            .build_query_scalar()
            .fetch_all(&mut *conn)
            .await?;
        members.extend(found);
    }

    Ok(members)
}

/// Delete every member, then insert `video_ids` at `0..n` in input order
pub async fn replace_all(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_ids: &[VideoId],
) -> Result<()> {
    let deleted = delete_all(conn, playlist_id).await?;
    insert_run(conn, playlist_id, 0, video_ids).await?;

    tracing::debug!(
        playlist_id = %playlist_id,
        deleted,
        inserted = video_ids.len(),
        "Replaced playlist membership"
    );
    Ok(())
}

/// Shift every row at `>= position` up by one and insert `video_id` there
pub async fn insert_shifted(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    position: i64,
    video_id: &VideoId,
) -> Result<()> {
    shift_range(conn, playlist_id, position, None, 1).await?;
    insert_run(conn, playlist_id, position, std::slice::from_ref(video_id)).await
}

/// Shift every row at `>= from` up by `width`, leaving `from..from+width` free
pub async fn open_gap(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    from: i64,
    width: i64,
) -> Result<()> {
    if width > 0 {
        shift_range(conn, playlist_id, from, None, width).await?;
    }
    Ok(())
}

/// Insert `video_ids` at `start, start+1, ...` without shifting anything.
/// The slots must be free.
pub async fn insert_run(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    start: i64,
    video_ids: &[VideoId],
) -> Result<()> {
    let now = Utc::now();

    for (chunk_index, chunk) in video_ids.chunks(BATCH_SIZE).enumerate() {
        let offset = start + (chunk_index * BATCH_SIZE) as i64;
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO playlist_videos (playlist_id, video_id, position, created_at) ",
        );
        query.push_values(chunk.iter().enumerate(), |mut row, (i, video_id)| {
            row.push_bind(playlist_id.clone())
                .push_bind(video_id.clone())
                .push_bind(offset + i as i64)
                .push_bind(now);
        });
        query.build().execute(&mut *conn).await?;
    }

    Ok(())
}

/// Delete one member and close the gap it leaves.
///
/// Returns the former position, or `None` if the video was not a member.
pub async fn delete_and_compact(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_id: &VideoId,
) -> Result<Option<i64>> {
    let Some(removed) = position_of(conn, playlist_id, video_id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ? AND video_id = ?")
        .bind(playlist_id)
        .bind(video_id)
        .execute(&mut *conn)
        .await?;

    shift_range(conn, playlist_id, removed + 1, None, -1).await?;

    tracing::debug!(playlist_id = %playlist_id, video_id = %video_id, removed, "Removed member");
    Ok(Some(removed))
}

/// Move one member from `old_position` to `new_position`, shifting the rows
/// in between by one. Both positions must be inside `0..n`.
pub async fn relocate(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_id: &VideoId,
    old_position: i64,
    new_position: i64,
) -> Result<()> {
    if old_position == new_position {
        return Ok(());
    }

    // Park the moving row just past the end; no shift below touches that slot
    let parking = max_position(conn, playlist_id).await? + 1;
    set_position(conn, playlist_id, video_id, parking).await?;

    if old_position < new_position {
        shift_range(conn, playlist_id, old_position + 1, Some(new_position), -1).await?;
    } else {
        shift_range(conn, playlist_id, new_position, Some(old_position - 1), 1).await?;
    }

    set_position(conn, playlist_id, video_id, new_position).await?;

    tracing::debug!(
        playlist_id = %playlist_id,
        video_id = %video_id,
        old_position,
        new_position,
        "Relocated member"
    );
    Ok(())
}

/// Rewrite positions so members follow `ordered` (a permutation of the
/// current membership). Rows keep their identity and insertion time.
pub async fn reorder(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    ordered: &[VideoId],
) -> Result<()> {
    sqlx::query(
        "UPDATE playlist_videos SET position = -position - 1 WHERE playlist_id = ? AND position >= 0",
    )
    .bind(playlist_id)
    .execute(&mut *conn)
    .await?;

    for (position, video_id) in ordered.iter().enumerate() {
        set_position(conn, playlist_id, video_id, position as i64).await?;
    }

    Ok(())
}

/// Delete every member; returns the number of rows removed
pub async fn delete_all(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ?")
        .bind(playlist_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

async fn set_position(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_id: &VideoId,
    position: i64,
) -> Result<()> {
    sqlx::query("UPDATE playlist_videos SET position = ? WHERE playlist_id = ? AND video_id = ?")
        .bind(position)
        .bind(playlist_id)
        .bind(video_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Add `delta` to every position in `from..=to` (`to = None` means no upper
/// bound). Rows first move to `-(p + delta) - 1`, which is negative and
/// distinct per row, then flip back to `p + delta`; no intermediate state
/// ever holds two rows on the same position.
async fn shift_range(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    from: i64,
    to: Option<i64>,
    delta: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE playlist_videos
        SET position = -(position + ?) - 1
        WHERE playlist_id = ?
          AND position >= ?
          AND (? IS NULL OR position <= ?)
        "#,
    )
    .bind(delta)
    .bind(playlist_id)
    .bind(from)
    .bind(to)
    .bind(to)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "UPDATE playlist_videos SET position = -position - 1 WHERE playlist_id = ? AND position < 0",
    )
    .bind(playlist_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
