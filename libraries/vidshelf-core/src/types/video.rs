/// Video reference types
///
/// Videos are owned by the ingestion side; the playlist engine only needs
/// to know that an id exists and which channel it belongs to.
use crate::types::VideoId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Video known to the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub channel_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Data for registering (or refreshing) a video reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVideo {
    pub id: VideoId,
    pub channel_id: String,
    pub title: String,
}
