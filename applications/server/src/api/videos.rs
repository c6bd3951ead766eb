/// Video registration routes
///
/// Stand-ins for the ingestion pipeline: they only keep the id/channel/title
/// reference that playlists point at.
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use vidshelf_core::{RegisterVideo, Video, VideoId};
use vidshelf_storage::videos;

/// POST /api/videos
pub async fn register_video(
    State(app_state): State<AppState>,
    Json(req): Json<RegisterVideo>,
) -> Result<Json<Video>> {
    let mut conn = app_state.pool.acquire().await?;
    let video = videos::upsert(&mut conn, req).await?;
    tracing::info!(video_id = %video.id, channel_id = %video.channel_id, "Registered video");
    Ok(Json(video))
}

/// DELETE /api/videos/:id
/// Compacts every playlist holding the video before dropping it
pub async fn delete_video(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<StatusCode> {
    let video_id = VideoId::new(id);

    if app_state.playlists.delete_video(&video_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound(format!("Video {} not found", video_id)))
    }
}
