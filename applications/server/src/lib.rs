//! vidshelf Server Library
//!
//! HTTP front end for the vidshelf playlist engine: playlist service with
//! per-playlist serialization, channel sync jobs, configuration.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::{PlaylistLocks, PlaylistService};
pub use state::AppState;

use sqlx::SqlitePool;
use std::sync::Arc;
use vidshelf_storage::SqliteVideoDirectory;

/// Wire services and jobs around an open, migrated pool.
///
/// Sync workers are not started; call [`jobs::ChannelSyncQueue::start`]
/// on `state.channel_sync` to run them.
pub fn build_state(pool: SqlitePool, sync_workers: usize) -> AppState {
    let directory = Arc::new(SqliteVideoDirectory::new(pool.clone()));
    let playlists = Arc::new(PlaylistService::new(
        pool.clone(),
        directory,
        PlaylistLocks::new(),
    ));
    let channel_sync = Arc::new(jobs::ChannelSyncQueue::new(
        Arc::clone(&playlists),
        sync_workers,
    ));
    AppState::new(pool, playlists, channel_sync)
}
