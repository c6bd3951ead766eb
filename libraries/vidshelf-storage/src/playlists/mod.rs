//! Playlists vertical slice
//!
//! - this module: playlist rows (create, read, list, update, delete)
//! - [`positions`]: row primitives keeping membership positions dense
//! - [`ordering`]: set/add/remove/move/bulk-add/clear/shuffle
//! - [`cursor`]: the stored "currently playing" index

pub mod cursor;
pub mod ordering;
pub mod positions;

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection};
use vidshelf_core::{
    error::{Result, VidshelfError},
    ordering::ensure_contiguous,
    types::{MAX_NAME_LEN, MAX_PAGE_LIMIT},
    CreatePlaylist, ListPlaylists, Page, Playlist, PlaylistDetail, PlaylistId, SourceType,
    UpdatePlaylist,
};

const PLAYLIST_COLUMNS: &str = r#"
    id, name, description, is_system, source_type, source_channel_id,
    source_external_id, source_is_active, source_last_synced_at,
    current_position, created_at
"#;

/// Create a new user playlist
pub async fn create(conn: &mut SqliteConnection, playlist: CreatePlaylist) -> Result<Playlist> {
    let name = validate_name(&playlist.name)?;
    let id = PlaylistId::generate();

    sqlx::query(
        r#"
        INSERT INTO playlists (id, name, description, is_system, source_type, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(&playlist.description)
    .bind(playlist.is_system)
    .bind(SourceType::Manual.as_str())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    tracing::info!(playlist_id = %id, name, "Created playlist");

    require(conn, &id).await
}

/// Get playlist by ID
pub async fn get_by_id(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(&format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(playlist_from_row).transpose()
}

/// Get playlist by ID, failing with `PlaylistNotFound`
pub async fn require(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<Playlist> {
    get_by_id(conn, id)
        .await?
        .ok_or_else(|| VidshelfError::PlaylistNotFound(id.clone()))
}

/// Playlist with its ordered video ids
pub async fn get_detail(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<PlaylistDetail> {
    let playlist = require(conn, id).await?;
    let video_ids = positions::ordered_video_ids(conn, id).await?;
    Ok(PlaylistDetail::new(playlist, video_ids))
}

/// List playlists ordered by name
pub async fn list(conn: &mut SqliteConnection, filter: &ListPlaylists) -> Result<Page<Playlist>> {
    if filter.limit == 0 || filter.limit > MAX_PAGE_LIMIT {
        return Err(VidshelfError::invalid_input(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }

    let mut count_query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM playlists");
    push_system_filter(&mut count_query, filter.is_system);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {PLAYLIST_COLUMNS} FROM playlists"));
    push_system_filter(&mut query, filter.is_system);
    query.push(" ORDER BY name ASC, created_at ASC LIMIT ");
    query.push_bind(i64::from(filter.limit));
    query.push(" OFFSET ");
    query.push_bind(i64::from(filter.offset));

    let rows = query.build().fetch_all(&mut *conn).await?;
    let items = rows.iter().map(playlist_from_row).collect::<Result<Vec<_>>>()?;

    Ok(Page::new(total as u64, items, filter.limit, filter.offset))
}

/// Update name and/or description
pub async fn update(
    conn: &mut SqliteConnection,
    id: &PlaylistId,
    update: UpdatePlaylist,
) -> Result<Playlist> {
    let mut playlist = require(conn, id).await?;

    if let Some(name) = update.name.as_deref() {
        playlist.name = validate_name(name)?.to_string();
    }
    if update.description.is_some() {
        playlist.description = update.description;
    }

    sqlx::query("UPDATE playlists SET name = ?, description = ? WHERE id = ?")
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(playlist)
}

/// Delete playlist; memberships go with it. Returns false if it did not exist.
pub async fn delete(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::info!(playlist_id = %id, "Deleted playlist");
    }
    Ok(deleted)
}

/// Find the playlist mirroring `external_id` from the given source
pub async fn find_by_source(
    conn: &mut SqliteConnection,
    source_type: SourceType,
    external_id: &str,
) -> Result<Option<Playlist>> {
    let row = sqlx::query(&format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE source_type = ? AND source_external_id = ?"
    ))
    .bind(source_type.as_str())
    .bind(external_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(playlist_from_row).transpose()
}

/// Verify the stored state of one playlist: positions are exactly `0..n`
/// and the cursor is inside the list.
pub async fn check_invariants(conn: &mut SqliteConnection, id: &PlaylistId) -> Result<()> {
    let stored = positions::positions(conn, id).await?;
    ensure_contiguous(&stored)?;

    let cursor = cursor::load(conn, id).await?;
    if !cursor.is_valid_for(stored.len()) {
        return Err(VidshelfError::invariant(format!(
            "current_position {:?} outside playlist of {} videos",
            cursor.get(),
            stored.len()
        )));
    }
    Ok(())
}

fn push_system_filter(query: &mut QueryBuilder<Sqlite>, is_system: Option<bool>) {
    if let Some(is_system) = is_system {
        query.push(" WHERE is_system = ");
        query.push_bind(is_system);
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(VidshelfError::invalid_input(format!(
            "playlist name must be 1 to {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed)
}

pub(crate) fn playlist_from_row(row: &SqliteRow) -> Result<Playlist> {
    let source_type: String = row.try_get("source_type")?;
    let source_type = SourceType::parse(&source_type).ok_or_else(|| {
        VidshelfError::Database(format!("unknown playlist source type '{}'", source_type))
    })?;
    let current_position: Option<i64> = row.try_get("current_position")?;

    Ok(Playlist {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_system: row.try_get("is_system")?,
        source_type,
        source_channel_id: row.try_get("source_channel_id")?,
        source_external_id: row.try_get("source_external_id")?,
        source_is_active: row.try_get("source_is_active")?,
        source_last_synced_at: row.try_get("source_last_synced_at")?,
        current_position: current_position.map(|p| p as u32),
        created_at: row.try_get("created_at")?,
    })
}
