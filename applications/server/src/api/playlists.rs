/// Playlists API routes
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use vidshelf_core::{
    CreatePlaylist, ListPlaylists, Page, Playlist, PlaylistDetail, PlaylistId, UpdatePlaylist,
    VideoId, VidshelfError,
};

#[derive(Debug, Deserialize)]
pub struct SetVideosRequest {
    pub video_ids: Vec<VideoId>,
}

#[derive(Debug, Deserialize)]
pub struct AddVideoRequest {
    pub video_id: VideoId,
    #[serde(default)]
    pub position: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BulkAddRequest {
    pub video_ids: Vec<VideoId>,
    #[serde(default)]
    pub position: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MoveVideoRequest {
    pub video_id: VideoId,
    pub new_position: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetPositionRequest {
    pub current_position: Option<u32>,
}

/// GET /api/playlists
pub async fn list_playlists(
    State(app_state): State<AppState>,
    Query(filter): Query<ListPlaylists>,
) -> Result<Json<Page<Playlist>>> {
    Ok(Json(app_state.playlists.list(&filter).await?))
}

/// POST /api/playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    Json(req): Json<CreatePlaylist>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let playlist = app_state.playlists.create(req).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists/:id
/// Playlist with its ordered video ids and cursor
pub async fn get_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state.playlists.get_detail(&PlaylistId::new(id)).await?;
    Ok(Json(detail))
}

/// PATCH /api/playlists/:id
pub async fn update_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<UpdatePlaylist>,
) -> Result<Json<Playlist>> {
    let playlist = app_state.playlists.update(&PlaylistId::new(id), req).await?;
    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<StatusCode> {
    app_state.playlists.delete(&PlaylistId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/playlists/:id/videos
pub async fn set_videos(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<SetVideosRequest>,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state
        .playlists
        .set_videos(&PlaylistId::new(id), &req.video_ids)
        .await?;
    Ok(Json(detail))
}

/// POST /api/playlists/:id/videos
pub async fn add_video(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<AddVideoRequest>,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state
        .playlists
        .add_video(&PlaylistId::new(id), &req.video_id, req.position)
        .await?;
    Ok(Json(detail))
}

/// POST /api/playlists/:id/videos/bulk
pub async fn bulk_add_videos(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<BulkAddRequest>,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state
        .playlists
        .bulk_add_videos(&PlaylistId::new(id), &req.video_ids, req.position)
        .await?;
    Ok(Json(detail))
}

/// PATCH /api/playlists/:id/videos/move
pub async fn move_video(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<MoveVideoRequest>,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state
        .playlists
        .move_video(&PlaylistId::new(id), &req.video_id, req.new_position)
        .await?;
    Ok(Json(detail))
}

/// DELETE /api/playlists/:id/videos
pub async fn clear_videos(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state.playlists.clear(&PlaylistId::new(id)).await?;
    Ok(Json(detail))
}

/// DELETE /api/playlists/:id/videos/:video_id
/// 204 when removed, 404 when the video was not a member
pub async fn remove_video(
    Path((id, video_id)): Path<(String, String)>,
    State(app_state): State<AppState>,
) -> Result<StatusCode> {
    let playlist_id = PlaylistId::new(id);
    let video_id = VideoId::new(video_id);

    if app_state.playlists.remove_video(&playlist_id, &video_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(VidshelfError::VideoNotInPlaylist {
            playlist_id,
            video_id,
        }
        .into())
    }
}

/// POST /api/playlists/:id/shuffle
pub async fn shuffle(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state.playlists.shuffle(&PlaylistId::new(id)).await?;
    Ok(Json(detail))
}

/// PATCH /api/playlists/:id/position
pub async fn set_position(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    Json(req): Json<SetPositionRequest>,
) -> Result<Json<PlaylistDetail>> {
    let detail = app_state
        .playlists
        .set_position(&PlaylistId::new(id), req.current_position)
        .await?;
    Ok(Json(detail))
}
