/// Shared application state
use crate::{jobs::ChannelSyncQueue, services::PlaylistService};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub playlists: Arc<PlaylistService>,
    pub channel_sync: Arc<ChannelSyncQueue>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        playlists: Arc<PlaylistService>,
        channel_sync: Arc<ChannelSyncQueue>,
    ) -> Self {
        Self {
            pool,
            playlists,
            channel_sync,
        }
    }
}
