/// Per-playlist write serialization
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use vidshelf_core::PlaylistId;

/// Held for the duration of one playlist mutation
pub type PlaylistGuard = OwnedMutexGuard<()>;

/// Keyed async mutex registry.
///
/// Writers on the same playlist queue behind one another; writers on
/// different playlists never contend. Idle entries are dropped on the next
/// acquisition.
#[derive(Clone, Default)]
pub struct PlaylistLocks {
    registry: Arc<Mutex<HashMap<PlaylistId, Arc<Mutex<()>>>>>,
}

impl PlaylistLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `playlist_id`
    pub async fn acquire(&self, playlist_id: &PlaylistId) -> PlaylistGuard {
        let lock = {
            let mut registry = self.registry.lock().await;
            // Only the registry holds it: nobody is waiting or writing
            registry.retain(|id, lock| id == playlist_id || Arc::strong_count(lock) > 1);
            Arc::clone(registry.entry(playlist_id.clone()).or_default())
        };

        lock.lock_owned().await
    }

    /// Number of playlists with a live entry
    pub async fn tracked(&self) -> usize {
        self.registry.lock().await.len()
    }
}
