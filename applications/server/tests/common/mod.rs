/// Common test utilities and fixtures
use sqlx::SqlitePool;
use tempfile::TempDir;
use vidshelf_core::{ChannelPlaylistSnapshot, CreatePlaylist, PlaylistId, RegisterVideo, VideoId};
use vidshelf_server::{build_state, AppState};
use vidshelf_storage::{playlists, sync, videos};

/// Application state over a migrated database in a temp dir
pub struct TestApp {
    pub state: AppState,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

        let pool = vidshelf_storage::create_pool(&db_url, 4)
            .await
            .expect("Failed to create pool");
        vidshelf_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            state: build_state(pool, 1),
            _temp_dir: temp_dir,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.state.pool
    }

    /// Register videos under `channel_id`
    pub async fn videos(&self, channel_id: &str, ids: &[&str]) {
        let mut conn = self.pool().acquire().await.unwrap();
        for id in ids {
            videos::upsert(
                &mut conn,
                RegisterVideo {
                    id: VideoId::new(*id),
                    channel_id: channel_id.to_string(),
                    title: format!("Video {}", id),
                },
            )
            .await
            .expect("Failed to register video");
        }
    }

    /// Manual playlist
    pub async fn playlist(&self, name: &str) -> PlaylistId {
        self.state
            .playlists
            .create(CreatePlaylist {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create playlist")
            .id
    }

    /// Channel-synchronized (read-only) playlist holding `ids`
    pub async fn channel_playlist(&self, channel_id: &str, ids: &[&str]) -> PlaylistId {
        let mut conn = self.pool().acquire().await.unwrap();
        let snapshot = ChannelPlaylistSnapshot {
            channel_id: channel_id.to_string(),
            external_playlist_id: format!("PL-{}", channel_id),
            name: "Uploads".to_string(),
            description: None,
            video_ids: ids.iter().map(|id| VideoId::new(*id)).collect(),
        };
        match sync::upsert_channel_playlist(&mut conn, &snapshot).await.unwrap() {
            sync::SyncOutcome::Created(id) | sync::SyncOutcome::Updated(id) => id,
            sync::SyncOutcome::Skipped => panic!("channel playlist fixture needs local videos"),
        }
    }

    /// Ordered member ids
    pub async fn order(&self, id: &PlaylistId) -> Vec<String> {
        let mut conn = self.pool().acquire().await.unwrap();
        playlists::get_detail(&mut conn, id)
            .await
            .unwrap()
            .video_ids
            .into_iter()
            .map(|v| v.as_str().to_string())
            .collect()
    }
}

pub fn ids(raw: &[&str]) -> Vec<VideoId> {
    raw.iter().map(|id| VideoId::new(*id)).collect()
}
