mod ids;
mod playlist;
mod video;

pub use ids::{PlaylistId, VideoId};
pub use playlist::{
    ChannelPlaylistSnapshot, CreatePlaylist, ListPlaylists, Page, Playlist, PlaylistDetail,
    SourceType, UpdatePlaylist, MAX_NAME_LEN, MAX_PAGE_LIMIT,
};
pub use video::{RegisterVideo, Video};
