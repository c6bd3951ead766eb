/// Core error types for vidshelf
use thiserror::Error;
use crate::types::{PlaylistId, VideoId};

/// Result type alias using `VidshelfError`
pub type Result<T> = std::result::Result<T, VidshelfError>;

/// Core error type for vidshelf
#[derive(Error, Debug)]
pub enum VidshelfError {
    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Video is not a member of the playlist
    #[error("Video '{video_id}' not found in playlist {playlist_id}")]
    VideoNotInPlaylist {
        /// Playlist that was searched
        playlist_id: PlaylistId,
        /// Video that is missing from it
        video_id: VideoId,
    },

    /// Referenced videos are unknown to the video directory (sorted)
    #[error("Videos not found: {}", join_ids(.0))]
    VideosNotFound(Vec<VideoId>),

    /// Explicit cursor position outside the playlist
    #[error("{}", describe_out_of_range(.position, .max))]
    PositionOutOfRange {
        /// Requested position
        position: u32,
        /// Last valid index, `None` when the playlist is empty
        max: Option<u32>,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Structural mutation of a read-only playlist
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Internal ordering defect (positions not contiguous)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl VidshelfError {
    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Build a `VideosNotFound` error with ids in ascending order
    pub fn videos_not_found(mut ids: Vec<VideoId>) -> Self {
        ids.sort();
        ids.dedup();
        Self::VideosNotFound(ids)
    }

    /// Whether the error means a referenced entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PlaylistNotFound(_) | Self::VideoNotInPlaylist { .. }
        )
    }

    /// Whether the error is a caller-side validation failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::VideosNotFound(_) | Self::PositionOutOfRange { .. } | Self::InvalidInput(_)
        )
    }
}

fn join_ids(ids: &[VideoId]) -> String {
    ids.iter()
        .map(VideoId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_out_of_range(position: &u32, max: &Option<u32>) -> String {
    match max {
        Some(max) => format!("Position {} out of bounds (max: {})", position, max),
        None => "Playlist is empty".to_string(),
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for VidshelfError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn videos_not_found_lists_sorted_unique_ids() {
        let err = VidshelfError::videos_not_found(vec![
            VideoId::new("c"),
            VideoId::new("a"),
            VideoId::new("c"),
        ]);
        assert_eq!(err.to_string(), "Videos not found: a, c");
        assert!(err.is_validation());
    }

    #[test]
    fn out_of_range_messages() {
        let empty = VidshelfError::PositionOutOfRange { position: 0, max: None };
        assert_eq!(empty.to_string(), "Playlist is empty");

        let beyond = VidshelfError::PositionOutOfRange { position: 4, max: Some(2) };
        assert_eq!(beyond.to_string(), "Position 4 out of bounds (max: 2)");
    }

    #[test]
    fn classification() {
        let missing = VidshelfError::VideoNotInPlaylist {
            playlist_id: PlaylistId::new("p"),
            video_id: VideoId::new("v"),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_validation());
        assert!(!VidshelfError::permission_denied("read-only").is_not_found());
    }
}
