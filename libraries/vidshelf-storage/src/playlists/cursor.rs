//! Persistence of the playback cursor (`playlists.current_position`)

use sqlx::SqliteConnection;
use vidshelf_core::{error::Result, PlaybackCursor, PlaylistId, VidshelfError};

/// Load the stored cursor of a playlist
pub async fn load(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<PlaybackCursor> {
    let row: Option<Option<i64>> =
        sqlx::query_scalar("SELECT current_position FROM playlists WHERE id = ?")
            .bind(playlist_id)
            .fetch_optional(&mut *conn)
            .await?;

    let position = row.ok_or_else(|| VidshelfError::PlaylistNotFound(playlist_id.clone()))?;
    Ok(PlaybackCursor::new(position.map(|p| p as u32)))
}

/// Write the cursor of a playlist
pub async fn store(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    cursor: PlaybackCursor,
) -> Result<()> {
    let result = sqlx::query("UPDATE playlists SET current_position = ? WHERE id = ?")
        .bind(cursor.get().map(i64::from))
        .bind(playlist_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(VidshelfError::PlaylistNotFound(playlist_id.clone()));
    }
    Ok(())
}
