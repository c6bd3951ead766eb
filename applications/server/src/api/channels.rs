/// Channel playlist sync routes
use crate::{
    error::{Result, ServerError},
    jobs::ChannelSyncJob,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use vidshelf_core::VideoId;

#[derive(Debug, Deserialize)]
pub struct SyncPlaylistsRequest {
    pub playlists: Vec<SnapshotRequest>,
}

/// One channel playlist as published on the external platform
#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    pub external_playlist_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub video_ids: Vec<VideoId>,
}

#[derive(Debug, Serialize)]
pub struct SyncAccepted {
    pub channel_id: String,
    pub playlists: usize,
}

/// POST /api/channels/:channel_id/playlists/sync
/// Queue a sync of every playlist the channel currently publishes
pub async fn sync_playlists(
    Path(channel_id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<SyncPlaylistsRequest>,
) -> Result<(StatusCode, Json<SyncAccepted>)> {
    if channel_id.trim().is_empty() {
        return Err(ServerError::BadRequest("channel id must not be empty".to_string()));
    }
    if let Some(blank) = req
        .playlists
        .iter()
        .find(|p| p.external_playlist_id.trim().is_empty())
    {
        return Err(ServerError::BadRequest(format!(
            "playlist '{}' has an empty external id",
            blank.name
        )));
    }

    let snapshots: Vec<_> = req
        .playlists
        .into_iter()
        .map(|p| vidshelf_core::ChannelPlaylistSnapshot {
            channel_id: channel_id.clone(),
            external_playlist_id: p.external_playlist_id,
            name: p.name,
            description: p.description,
            video_ids: p.video_ids,
        })
        .collect();

    let accepted = SyncAccepted {
        channel_id: channel_id.clone(),
        playlists: snapshots.len(),
    };

    app_state
        .channel_sync
        .enqueue(ChannelSyncJob {
            channel_id,
            snapshots,
        })
        .await;

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}
