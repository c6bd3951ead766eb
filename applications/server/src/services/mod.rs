/// Server services
pub mod locks;
pub mod playlists;

pub use locks::PlaylistLocks;
pub use playlists::PlaylistService;
