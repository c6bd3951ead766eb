/// API route modules
pub mod channels;
pub mod health;
pub mod playlists;
pub mod videos;

use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router
pub fn create_router(app_state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        // Playlists
        .route(
            "/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route(
            "/playlists/:id",
            get(playlists::get_playlist)
                .patch(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route(
            "/playlists/:id/videos",
            post(playlists::add_video)
                .put(playlists::set_videos)
                .delete(playlists::clear_videos),
        )
        .route("/playlists/:id/videos/bulk", post(playlists::bulk_add_videos))
        .route("/playlists/:id/videos/move", patch(playlists::move_video))
        .route(
            "/playlists/:id/videos/:video_id",
            delete(playlists::remove_video),
        )
        .route("/playlists/:id/shuffle", post(playlists::shuffle))
        .route("/playlists/:id/position", patch(playlists::set_position))
        // Ingestion seams
        .route("/videos", post(videos::register_video))
        .route("/videos/:id", delete(videos::delete_video))
        .route(
            "/channels/:channel_id/playlists/sync",
            post(channels::sync_playlists),
        );

    Router::new()
        .nest("/api", routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
