//! Ordering engine
//!
//! Whole-list operations on a playlist's membership, built from the
//! primitives in [`positions`]. Each function leaves the playlist's
//! positions at exactly `0..n` provided the caller runs it inside one
//! transaction. None of them touch `current_position`; that is the
//! caller's job (see [`super::cursor`]).

use super::positions;
use rand::Rng;
use sqlx::SqliteConnection;
use vidshelf_core::{
    error::{Result, VidshelfError},
    ordering::{dedup_first, insert_slot, move_slot, shuffle_after_anchor},
    PlaylistId, VideoId,
};

/// What `add` did with the video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// New member inserted at `position`
    Inserted { position: u32 },
    /// Already a member; relocated (possibly onto the same slot)
    Moved { from: u32, to: u32 },
}

/// Result of a bulk insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkAddOutcome {
    /// Position of the first inserted id
    pub start: u32,
    /// Number of distinct ids inserted
    pub inserted: usize,
    /// How many of them were members before and got pulled out first
    pub relocated: usize,
}

/// Replace the whole membership, preserving input order.
///
/// `video_ids` must not contain duplicates.
pub async fn set(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_ids: &[VideoId],
) -> Result<()> {
    positions::replace_all(conn, playlist_id, video_ids).await
}

/// Insert `video_id` at `position` (append when `None`).
///
/// An existing member is moved instead; without a position it goes to the
/// end. Positions past the end are clamped to the end.
pub async fn add(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_id: &VideoId,
    position: Option<u32>,
) -> Result<AddOutcome> {
    let len = positions::count(conn, playlist_id).await?;

    if let Some(existing) = positions::position_of(conn, playlist_id, video_id).await? {
        let target = move_slot(position.unwrap_or(u32::MAX), len) as i64;
        positions::relocate(conn, playlist_id, video_id, existing, target).await?;
        return Ok(AddOutcome::Moved {
            from: existing as u32,
            to: target as u32,
        });
    }

    let target = insert_slot(position, len);
    if target == len {
        positions::insert_run(conn, playlist_id, target as i64, std::slice::from_ref(video_id))
            .await?;
    } else {
        positions::insert_shifted(conn, playlist_id, target as i64, video_id).await?;
    }

    Ok(AddOutcome::Inserted {
        position: target as u32,
    })
}

/// Remove `video_id` and compact.
///
/// Returns the removed entry's former index, or `None` when the video was
/// not a member (nothing changes).
pub async fn remove(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_id: &VideoId,
) -> Result<Option<u32>> {
    let removed = positions::delete_and_compact(conn, playlist_id, video_id).await?;
    Ok(removed.map(|p| p as u32))
}

/// Move an existing member to `new_position`.
///
/// Fails with `VideoNotInPlaylist` for non-members and with
/// `PositionOutOfRange` when `new_position` is past the last index; callers
/// that want lenient behaviour clamp first.
pub async fn move_to(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_id: &VideoId,
    new_position: u32,
) -> Result<()> {
    let Some(old_position) = positions::position_of(conn, playlist_id, video_id).await? else {
        return Err(VidshelfError::VideoNotInPlaylist {
            playlist_id: playlist_id.clone(),
            video_id: video_id.clone(),
        });
    };

    let max = positions::max_position(conn, playlist_id).await?;
    if i64::from(new_position) > max {
        return Err(VidshelfError::PositionOutOfRange {
            position: new_position,
            max: Some(max as u32),
        });
    }

    positions::relocate(
        conn,
        playlist_id,
        video_id,
        old_position,
        i64::from(new_position),
    )
    .await
}

/// Insert several videos as one contiguous run.
///
/// Ids that are already members are pulled out first, repeated ids keep
/// their first occurrence, and the run lands at `start` (clamped to the
/// end) or is appended when `start` is `None`.
pub async fn bulk_add(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    video_ids: &[VideoId],
    start: Option<u32>,
) -> Result<BulkAddOutcome> {
    let unique = dedup_first(video_ids);

    let existing = positions::members_among(conn, playlist_id, &unique).await?;
    for video_id in unique.iter().filter(|id| existing.contains(*id)) {
        positions::delete_and_compact(conn, playlist_id, video_id).await?;
    }

    let len = positions::count(conn, playlist_id).await?;
    let start = insert_slot(start, len);
    if start < len {
        positions::open_gap(conn, playlist_id, start as i64, unique.len() as i64).await?;
    }
    positions::insert_run(conn, playlist_id, start as i64, &unique).await?;

    tracing::debug!(
        playlist_id = %playlist_id,
        start,
        inserted = unique.len(),
        relocated = existing.len(),
        "Bulk-added videos"
    );

    Ok(BulkAddOutcome {
        start: start as u32,
        inserted: unique.len(),
        relocated: existing.len(),
    })
}

/// Remove every member; returns how many rows went away
pub async fn clear(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<u64> {
    positions::delete_all(conn, playlist_id).await
}

/// Randomly reorder the playlist. With a valid `anchor` only the entries
/// after it move. Returns the new order.
pub async fn shuffle<R>(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    anchor: Option<u32>,
    rng: &mut R,
) -> Result<Vec<VideoId>>
where
    R: Rng + Send + ?Sized,
{
    let mut video_ids = positions::ordered_video_ids(conn, playlist_id).await?;
    if video_ids.len() <= 1 {
        return Ok(video_ids);
    }

    shuffle_after_anchor(&mut video_ids, anchor, rng);
    positions::reorder(conn, playlist_id, &video_ids).await?;

    Ok(video_ids)
}
