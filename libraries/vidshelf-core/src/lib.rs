//! vidshelf Core
//!
//! Platform-agnostic types, traits, and error handling for the vidshelf
//! media-library backend.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Playlist`, `PlaylistDetail`, `Video`, paging types
//! - **Collaborator Traits**: `VideoDirectory`
//! - **Ordering Rules**: the `PlaybackCursor` adjustment rules and the pure
//!   list helpers (dedup, anchored shuffle, clamping) shared by every writer
//! - **Error Handling**: unified `VidshelfError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use vidshelf_core::PlaybackCursor;
//!
//! // Cursor at index 2 of ["a", "b", "c"]; "a" (index 0) is removed
//! let mut cursor = PlaybackCursor::new(Some(2));
//! cursor.on_remove(0, 2);
//! assert_eq!(cursor.get(), Some(1));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cursor;
pub mod directory;
pub mod error;
pub mod ordering;
pub mod types;

// Re-export commonly used types
pub use cursor::PlaybackCursor;
pub use directory::VideoDirectory;
pub use error::{Result, VidshelfError};

pub use types::{
    ChannelPlaylistSnapshot, CreatePlaylist, ListPlaylists, Page, Playlist, PlaylistDetail,
    PlaylistId, RegisterVideo, SourceType, UpdatePlaylist, Video, VideoId,
};
