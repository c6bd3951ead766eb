/// API integration tests
/// Tests complete HTTP request/response cycles with real database
mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::TestApp;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use vidshelf_server::api;

/// Helper to create test app router
async fn create_test_app() -> (Router, TestApp) {
    let app = TestApp::new().await;
    let router = api::create_router(app.state.clone());
    (router, app)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, value)
}

async fn create_playlist(router: &Router, name: &str) -> String {
    let (status, body) = send(router, "POST", "/api/playlists", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Test GET /api/health
#[tokio::test]
async fn test_health() {
    let (router, _app) = create_test_app().await;

    let (status, body) = send(&router, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

/// Test playlist CRUD over HTTP
#[tokio::test]
async fn test_playlist_crud() {
    let (router, _app) = create_test_app().await;

    let id = create_playlist(&router, "Later").await;

    let (status, body) = send(&router, "GET", &format!("/api/playlists/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Later");
    assert_eq!(body["total_videos"], 0);
    assert_eq!(body["current_position"], Value::Null);

    let (status, body) = send(
        &router,
        "PATCH",
        &format!("/api/playlists/{}", id),
        Some(json!({ "description": "weekend" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "weekend");

    let (status, body) = send(&router, "GET", "/api/playlists?limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["has_more"], false);

    let (status, _) = send(&router, "GET", "/api/playlists?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, "DELETE", &format!("/api/playlists/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, "GET", &format!("/api/playlists/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

/// Test the membership routes end to end
#[tokio::test]
async fn test_membership_flow() {
    let (router, app) = create_test_app().await;
    app.videos("ch", &["a", "b", "c", "d"]).await;
    let id = create_playlist(&router, "Flow").await;
    let base = format!("/api/playlists/{}", id);

    let (status, body) = send(
        &router,
        "PUT",
        &format!("{}/videos", base),
        Some(json!({ "video_ids": ["a", "b", "c"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_ids"], json!(["a", "b", "c"]));

    let (status, body) = send(
        &router,
        "POST",
        &format!("{}/videos", base),
        Some(json!({ "video_id": "d", "position": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_ids"], json!(["a", "d", "b", "c"]));

    let (status, body) = send(
        &router,
        "PATCH",
        &format!("{}/videos/move", base),
        Some(json!({ "video_id": "a", "new_position": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_ids"], json!(["d", "b", "c", "a"]));

    let (status, body) = send(
        &router,
        "PATCH",
        &format!("{}/position", base),
        Some(json!({ "current_position": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_position"], 3);

    let (status, _) = send(&router, "DELETE", &format!("{}/videos/b", base), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&router, "DELETE", &format!("{}/videos/b", base), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&router, "GET", &base, None).await;
    assert_eq!(body["video_ids"], json!(["d", "c", "a"]));
    assert_eq!(body["current_position"], 2);

    let (status, body) = send(
        &router,
        "POST",
        &format!("{}/videos/bulk", base),
        Some(json!({ "video_ids": ["b", "a", "b"], "position": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_ids"], json!(["b", "a", "d", "c"]));

    let (status, body) = send(&router, "POST", &format!("{}/shuffle", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_videos"], 4);

    let (status, body) = send(&router, "DELETE", &format!("{}/videos", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_ids"], json!([]));
    assert_eq!(body["current_position"], Value::Null);
}

/// Test validation errors carry the missing ids
#[tokio::test]
async fn test_unknown_videos_rejected() {
    let (router, _app) = create_test_app().await;
    let id = create_playlist(&router, "P").await;

    let (status, body) = send(
        &router,
        "POST",
        &format!("/api/playlists/{}/videos/bulk", id),
        Some(json!({ "video_ids": ["x2", "x1"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_video_ids"], json!(["x1", "x2"]));
}

/// Test position outside the list
#[tokio::test]
async fn test_set_position_on_empty_playlist() {
    let (router, _app) = create_test_app().await;
    let id = create_playlist(&router, "P").await;

    let (status, body) = send(
        &router,
        "PATCH",
        &format!("/api/playlists/{}/position", id),
        Some(json!({ "current_position": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Playlist is empty");
}

/// Test the read-only guard surfaces as 403
#[tokio::test]
async fn test_channel_playlist_is_read_only() {
    let (router, app) = create_test_app().await;
    app.videos("chan", &["a", "b"]).await;
    let id = app.channel_playlist("chan", &["a", "b"]).await;

    let (status, _) = send(&router, "DELETE", &format!("/api/playlists/{}/videos", id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        "PATCH",
        &format!("/api/playlists/{}/position", id),
        Some(json!({ "current_position": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

/// Test video registration and deletion compacting playlists
#[tokio::test]
async fn test_delete_video_compacts_playlists() {
    let (router, app) = create_test_app().await;

    for id in ["a", "b", "c"] {
        let (status, body) = send(
            &router,
            "POST",
            "/api/videos",
            Some(json!({ "id": id, "channel_id": "ch", "title": format!("Video {}", id) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
    }

    let playlist = create_playlist(&router, "P").await;
    let base = format!("/api/playlists/{}", playlist);
    send(&router, "PUT", &format!("{}/videos", base), Some(json!({ "video_ids": ["a", "b", "c"] }))).await;
    send(&router, "PATCH", &format!("{}/position", base), Some(json!({ "current_position": 2 }))).await;

    let (status, _) = send(&router, "DELETE", "/api/videos/a", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&router, "DELETE", "/api/videos/a", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&router, "GET", &base, None).await;
    assert_eq!(body["video_ids"], json!(["b", "c"]));
    assert_eq!(body["current_position"], 1);
    assert_eq!(app.order(&vidshelf_core::PlaylistId::new(playlist)).await, vec!["b", "c"]);
}

/// Test channel sync is queued and applied by a worker
#[tokio::test]
async fn test_channel_sync_enqueues_and_applies() {
    let (router, app) = create_test_app().await;
    app.videos("chan", &["a", "b"]).await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/channels/chan/playlists/sync",
        Some(json!({
            "playlists": [
                { "external_playlist_id": "PL1", "name": "Uploads", "video_ids": ["b", "a"] }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["playlists"], 1);
    assert_eq!(app.state.channel_sync.queue_length().await, 1);

    // Drive the queued job the way a worker would
    let job = app.state.channel_sync.pop().await.unwrap();
    let report = app.state.channel_sync.process(&job).await.unwrap();
    assert_eq!(report.created, 1);

    let (_, body) = send(&router, "GET", "/api/playlists?is_system=true", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["source_type"], "channel");
    let id = body["items"][0]["id"].as_str().unwrap().to_string();

    let (_, body) = send(&router, "GET", &format!("/api/playlists/{}", id), None).await;
    assert_eq!(body["video_ids"], json!(["b", "a"]));
}
