//! vidshelf Storage
//!
//! `SQLite` persistence for the vidshelf playlist engine.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature owns its own queries and logic
//!   (`playlists`, `videos`, `sync`)
//! - **Connection-scoped**: every operation takes a `&mut SqliteConnection`,
//!   so callers decide the transaction boundary (`&mut *tx`)
//! - **Immediate writes**: write transactions come from [`begin_write`],
//!   which takes SQLite's write lock at `BEGIN`
//! - **Dense ordering**: `playlists::positions` keeps each playlist's
//!   positions at exactly `0..n`; `playlists::ordering` builds the
//!   set/add/remove/move/bulk-add/clear/shuffle operations on top
//!
//! # Example
//!
//! ```rust,no_run
//! use vidshelf_storage::{create_pool, playlists, run_migrations};
//! use vidshelf_core::{CreatePlaylist, VideoId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://vidshelf.db", 5).await?;
//! run_migrations(&pool).await?;
//!
//! let mut tx = vidshelf_storage::begin_write(&pool).await?;
//! let playlist = playlists::create(
//!     &mut tx,
//!     CreatePlaylist { name: "Later".into(), ..Default::default() },
//! )
//! .await?;
//! playlists::ordering::add(&mut tx, &playlist.id, &VideoId::new("v1"), None).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod playlists;
pub mod sync;
pub mod videos;

pub use error::StorageError;
pub use videos::SqliteVideoDirectory;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::Transaction;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Rows per multi-value statement; keeps well under SQLite's bind limit
pub(crate) const BATCH_SIZE: usize = 500;

/// Open a write transaction with `BEGIN IMMEDIATE`.
///
/// A deferred transaction that reads first cannot upgrade to a writer once
/// another connection has committed (`SQLITE_BUSY_SNAPSHOT`), and the busy
/// timeout does not apply to that case. Taking the write lock up front makes
/// concurrent writers wait on the busy timeout instead. Dropping the
/// transaction without committing rolls it back.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://vidshelf.db>`)
/// * `max_connections` - upper bound on pooled connections
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    if database_url.trim().is_empty() {
        return Err(StorageError::Connection("database URL is empty".to_string()));
    }

    tracing::debug!(database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(max_connections, "SQLite pool ready");

    Ok(pool)
}
