/// Playlist service - whole API-facing playlist operations
///
/// Every mutation takes the playlist's lock, then runs its position writes
/// and cursor adjustment in one immediate write transaction. The detail
/// view returned is read inside that same transaction. Video deletion and
/// channel sync go through here too, so they queue behind the same locks.
use crate::{
    error::{Result, ServerError},
    services::locks::PlaylistLocks,
};
use rand::{rngs::StdRng, SeedableRng};
use sqlx::{SqliteConnection, SqlitePool};
use std::{collections::HashSet, sync::Arc};
use vidshelf_core::{
    directory::missing_ids, ordering::move_slot, ChannelPlaylistSnapshot, CreatePlaylist,
    ListPlaylists, Page, Playlist, PlaylistDetail, PlaylistId, SourceType, UpdatePlaylist,
    VideoDirectory, VideoId, VidshelfError,
};
use vidshelf_storage::{
    begin_write,
    playlists::{self, cursor, ordering, positions},
    sync::{self, SyncOutcome, SyncReport},
    videos,
};

#[derive(Clone)]
pub struct PlaylistService {
    pool: SqlitePool,
    directory: Arc<dyn VideoDirectory>,
    locks: PlaylistLocks,
}

impl PlaylistService {
    pub fn new(pool: SqlitePool, directory: Arc<dyn VideoDirectory>, locks: PlaylistLocks) -> Self {
        Self {
            pool,
            directory,
            locks,
        }
    }

    pub async fn create(&self, playlist: CreatePlaylist) -> Result<Playlist> {
        let mut conn = self.pool.acquire().await?;
        Ok(playlists::create(&mut conn, playlist).await?)
    }

    pub async fn list(&self, filter: &ListPlaylists) -> Result<Page<Playlist>> {
        let mut conn = self.pool.acquire().await?;
        Ok(playlists::list(&mut conn, filter).await?)
    }

    pub async fn get_detail(&self, id: &PlaylistId) -> Result<PlaylistDetail> {
        let mut conn = self.pool.acquire().await?;
        Ok(playlists::get_detail(&mut conn, id).await?)
    }

    /// Metadata update; allowed on synchronized playlists too
    pub async fn update(&self, id: &PlaylistId, update: UpdatePlaylist) -> Result<Playlist> {
        let _guard = self.locks.acquire(id).await;
        let mut tx = begin_write(&self.pool).await?;
        let playlist = playlists::update(&mut tx, id, update).await?;
        tx.commit().await?;
        Ok(playlist)
    }

    pub async fn delete(&self, id: &PlaylistId) -> Result<()> {
        let _guard = self.locks.acquire(id).await;
        let mut conn = self.pool.acquire().await?;
        if playlists::delete(&mut conn, id).await? {
            Ok(())
        } else {
            Err(VidshelfError::PlaylistNotFound(id.clone()).into())
        }
    }

    /// Replace the membership. Duplicate ids are rejected.
    pub async fn set_videos(&self, id: &PlaylistId, video_ids: &[VideoId]) -> Result<PlaylistDetail> {
        let _guard = self.locks.acquire(id).await;
        self.require_writable(id, "set videos").await?;

        let mut seen = HashSet::with_capacity(video_ids.len());
        let mut repeated: Vec<&VideoId> =
            video_ids.iter().filter(|vid| !seen.insert(*vid)).collect();
        if !repeated.is_empty() {
            repeated.sort();
            repeated.dedup();
            let repeated: Vec<&str> = repeated.iter().map(|vid| vid.as_str()).collect();
            return Err(VidshelfError::invalid_input(format!(
                "Duplicate video ids: {}",
                repeated.join(", ")
            ))
            .into());
        }
        self.ensure_videos_exist(video_ids).await?;

        let mut tx = begin_write(&self.pool).await?;
        playlists::require(&mut tx, id).await?;
        ordering::set(&mut tx, id, video_ids).await?;

        let mut current = cursor::load(&mut tx, id).await?;
        current.on_set(video_ids.len());
        cursor::store(&mut tx, id, current).await?;

        let detail = finish(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(playlist_id = %id, videos = video_ids.len(), "Set playlist videos");
        Ok(detail)
    }

    /// Add one video (or move it if already a member)
    pub async fn add_video(
        &self,
        id: &PlaylistId,
        video_id: &VideoId,
        position: Option<u32>,
    ) -> Result<PlaylistDetail> {
        let _guard = self.locks.acquire(id).await;
        self.require_writable(id, "add video").await?;
        self.ensure_videos_exist(std::slice::from_ref(video_id)).await?;

        let mut tx = begin_write(&self.pool).await?;
        playlists::require(&mut tx, id).await?;
        let outcome = ordering::add(&mut tx, id, video_id, position).await?;
        let detail = finish(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(playlist_id = %id, video_id = %video_id, ?outcome, "Added video to playlist");
        Ok(detail)
    }

    /// Insert several videos as one run at `start` (append when `None`)
    pub async fn bulk_add_videos(
        &self,
        id: &PlaylistId,
        video_ids: &[VideoId],
        start: Option<u32>,
    ) -> Result<PlaylistDetail> {
        let _guard = self.locks.acquire(id).await;
        self.require_writable(id, "add videos").await?;
        self.ensure_videos_exist(video_ids).await?;

        let mut tx = begin_write(&self.pool).await?;
        playlists::require(&mut tx, id).await?;
        let outcome = ordering::bulk_add(&mut tx, id, video_ids, start).await?;
        let detail = finish(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            playlist_id = %id,
            start = outcome.start,
            inserted = outcome.inserted,
            relocated = outcome.relocated,
            "Bulk-added videos to playlist"
        );
        Ok(detail)
    }

    /// Move a member; `new_position` past the end is clamped to the last slot
    pub async fn move_video(
        &self,
        id: &PlaylistId,
        video_id: &VideoId,
        new_position: u32,
    ) -> Result<PlaylistDetail> {
        let _guard = self.locks.acquire(id).await;
        self.require_writable(id, "move video").await?;

        let mut tx = begin_write(&self.pool).await?;
        playlists::require(&mut tx, id).await?;
        let len = positions::count(&mut tx, id).await?;
        let target = if len == 0 {
            new_position
        } else {
            move_slot(new_position, len) as u32
        };
        ordering::move_to(&mut tx, id, video_id, target).await?;
        let detail = finish(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(playlist_id = %id, video_id = %video_id, position = target, "Moved video");
        Ok(detail)
    }

    /// Remove a member. Returns false (and changes nothing) when the video
    /// was not in the playlist.
    pub async fn remove_video(&self, id: &PlaylistId, video_id: &VideoId) -> Result<bool> {
        let _guard = self.locks.acquire(id).await;
        self.require_writable(id, "remove video").await?;

        let mut tx = begin_write(&self.pool).await?;
        playlists::require(&mut tx, id).await?;
        let Some(removed) = ordering::remove(&mut tx, id, video_id).await? else {
            return Ok(false);
        };

        let remaining = positions::count(&mut tx, id).await?;
        let mut current = cursor::load(&mut tx, id).await?;
        current.on_remove(removed, remaining);
        cursor::store(&mut tx, id, current).await?;
        check(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(playlist_id = %id, video_id = %video_id, removed, "Removed video from playlist");
        Ok(true)
    }

    pub async fn clear(&self, id: &PlaylistId) -> Result<PlaylistDetail> {
        let _guard = self.locks.acquire(id).await;
        self.require_writable(id, "clear").await?;

        let mut tx = begin_write(&self.pool).await?;
        playlists::require(&mut tx, id).await?;
        let removed = ordering::clear(&mut tx, id).await?;

        let mut current = cursor::load(&mut tx, id).await?;
        current.on_clear();
        cursor::store(&mut tx, id, current).await?;

        let detail = finish(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(playlist_id = %id, removed, "Cleared playlist");
        Ok(detail)
    }

    /// Shuffle; with a valid cursor only the entries after it move
    pub async fn shuffle(&self, id: &PlaylistId) -> Result<PlaylistDetail> {
        let _guard = self.locks.acquire(id).await;
        self.require_writable(id, "shuffle").await?;

        let mut tx = begin_write(&self.pool).await?;
        playlists::require(&mut tx, id).await?;
        let anchor = cursor::load(&mut tx, id).await?.get();
        let mut rng = StdRng::from_entropy();
        ordering::shuffle(&mut tx, id, anchor, &mut rng).await?;
        let detail = finish(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(playlist_id = %id, ?anchor, "Shuffled playlist");
        Ok(detail)
    }

    /// Explicit cursor write; allowed on synchronized playlists
    pub async fn set_position(&self, id: &PlaylistId, position: Option<u32>) -> Result<PlaylistDetail> {
        let _guard = self.locks.acquire(id).await;

        let mut tx = begin_write(&self.pool).await?;
        playlists::require(&mut tx, id).await?;
        let len = positions::count(&mut tx, id).await?;
        let mut current = cursor::load(&mut tx, id).await?;
        current.set(position, len)?;
        cursor::store(&mut tx, id, current).await?;
        let detail = finish(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(playlist_id = %id, ?position, "Set playback position");
        Ok(detail)
    }

    /// Delete a video, compacting every playlist that held it.
    ///
    /// The holders' locks are taken in playlist id order before the write
    /// begins. Returns false if the video did not exist.
    pub async fn delete_video(&self, video_id: &VideoId) -> Result<bool> {
        let holders = {
            let mut conn = self.pool.acquire().await?;
            videos::holders(&mut conn, video_id).await?
        };

        let mut guards = Vec::with_capacity(holders.len());
        for playlist_id in &holders {
            guards.push(self.locks.acquire(playlist_id).await);
        }

        let mut tx = begin_write(&self.pool).await?;
        let deleted = videos::delete(&mut tx, video_id).await?;
        for playlist_id in &holders {
            check(&mut tx, playlist_id).await?;
        }
        tx.commit().await?;
        drop(guards);

        Ok(deleted)
    }

    /// Mirror every playlist a channel currently publishes.
    ///
    /// Each snapshot commits in its own transaction under the lock of the
    /// playlist it rewrites, so a failure leaves the earlier ones in place.
    /// Mirrors not in `snapshots` are deactivated once all of them succeeded.
    pub async fn sync_channel(
        &self,
        channel_id: &str,
        snapshots: &[ChannelPlaylistSnapshot],
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let mut seen = HashSet::with_capacity(snapshots.len());

        for snapshot in snapshots {
            if snapshot.channel_id != channel_id {
                return Err(VidshelfError::invalid_input(format!(
                    "snapshot {} belongs to channel {}, not {}",
                    snapshot.external_playlist_id, snapshot.channel_id, channel_id
                ))
                .into());
            }
            seen.insert(snapshot.external_playlist_id.clone());

            let existing = {
                let mut conn = self.pool.acquire().await?;
                playlists::find_by_source(
                    &mut conn,
                    SourceType::Channel,
                    &snapshot.external_playlist_id,
                )
                .await?
            };
            // A mirror created below is not visible to anyone until commit
            let _guard = match &existing {
                Some(playlist) => Some(self.locks.acquire(&playlist.id).await),
                None => None,
            };

            let mut tx = begin_write(&self.pool).await?;
            let outcome = sync::upsert_channel_playlist(&mut tx, snapshot).await?;
            match &outcome {
                SyncOutcome::Created(id) | SyncOutcome::Updated(id) => check(&mut tx, id).await?,
                SyncOutcome::Skipped => {}
            }
            tx.commit().await?;

            match outcome {
                SyncOutcome::Created(_) => report.created += 1,
                SyncOutcome::Updated(_) => report.updated += 1,
                SyncOutcome::Skipped => report.skipped += 1,
            }
        }

        let mut tx = begin_write(&self.pool).await?;
        report.deactivated = sync::deactivate_missing(&mut tx, channel_id, &seen).await?;
        tx.commit().await?;

        tracing::info!(
            channel_id,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            deactivated = report.deactivated,
            "Channel sync finished"
        );

        Ok(report)
    }

    /// Fail with NotFound or PermissionDenied before any write starts
    async fn require_writable(&self, id: &PlaylistId, action: &str) -> Result<Playlist> {
        let mut conn = self.pool.acquire().await?;
        let playlist = playlists::require(&mut conn, id).await?;
        if playlist.is_read_only() {
            tracing::warn!(playlist_id = %id, action, "Rejected mutation of read-only playlist");
            return Err(VidshelfError::permission_denied(format!(
                "playlist {} is synchronized from a channel and cannot {}",
                id, action
            ))
            .into());
        }
        Ok(playlist)
    }

    async fn ensure_videos_exist(&self, video_ids: &[VideoId]) -> Result<()> {
        if video_ids.is_empty() {
            return Ok(());
        }
        let found = self.directory.exists_all(video_ids).await?;
        let missing = missing_ids(video_ids, &found);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(VidshelfError::videos_not_found(missing).into())
        }
    }
}

/// Invariant check, then the detail view, both inside the caller's transaction
async fn finish(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<PlaylistDetail> {
    check(conn, id).await?;
    Ok(playlists::get_detail(conn, id).await?)
}

async fn check(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<()> {
    playlists::check_invariants(conn, id).await.map_err(|e| {
        tracing::error!(playlist_id = %id, error = %e, "Playlist invariants violated, rolling back");
        ServerError::from(e)
    })
}
