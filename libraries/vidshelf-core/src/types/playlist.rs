/// Playlist domain types
use crate::types::{PlaylistId, VideoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted playlist name, in characters
pub const MAX_NAME_LEN: usize = 255;

/// Largest page size accepted by [`ListPlaylists`]
pub const MAX_PAGE_LIMIT: u32 = 200;

/// Where a playlist's contents come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Curated by the user through the public API
    Manual,
    /// Mirrored from a channel on the external platform by the sync job
    Channel,
}

impl SourceType {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Manual => "manual",
            SourceType::Channel => "channel",
        }
    }

    /// Parse from the database representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(SourceType::Manual),
            "channel" => Some(SourceType::Channel),
            _ => None,
        }
    }
}

/// Playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Owned by synchronization rather than the user
    pub is_system: bool,

    /// Origin of the playlist contents
    pub source_type: SourceType,

    /// Channel the playlist is mirrored from
    pub source_channel_id: Option<String>,

    /// Playlist id on the external platform
    pub source_external_id: Option<String>,

    /// False once the external playlist disappeared from the channel
    pub source_is_active: bool,

    /// Last time the sync job wrote this playlist
    pub source_last_synced_at: Option<DateTime<Utc>>,

    /// Index of the "currently playing" entry
    pub current_position: Option<u32>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Whether the public mutation surface must refuse structural changes
    pub fn is_read_only(&self) -> bool {
        self.source_type == SourceType::Channel
    }
}

/// Playlist with its ordered membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,

    /// Number of member videos
    pub total_videos: usize,

    /// Member video ids by ascending position
    pub video_ids: Vec<VideoId>,
}

impl PlaylistDetail {
    /// Build a detail view from a playlist row and its ordered ids
    pub fn new(playlist: Playlist, video_ids: Vec<VideoId>) -> Self {
        Self {
            playlist,
            total_videos: video_ids.len(),
            video_ids,
        }
    }

    /// Current cursor position
    pub fn current_position(&self) -> Option<u32> {
        self.playlist.current_position
    }
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlaylist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_system: bool,
}

/// Metadata update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlaylist {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Paging and filtering for playlist listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPlaylists {
    #[serde(default)]
    pub is_system: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    50
}

impl Default for ListPlaylists {
    fn default() -> Self {
        Self {
            is_system: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub items: Vec<T>,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Assemble a page, deriving `has_more` from the totals
    pub fn new(total: u64, items: Vec<T>, limit: u32, offset: u32) -> Self {
        Self {
            total,
            items,
            limit,
            offset,
            has_more: u64::from(offset) + u64::from(limit) < total,
        }
    }
}

/// Ordered contents of one channel playlist as seen on the external platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPlaylistSnapshot {
    pub channel_id: String,
    pub external_playlist_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub video_ids: Vec<VideoId>,
}
