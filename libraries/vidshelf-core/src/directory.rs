//! Video directory collaborator
//!
//! Playlist mutations must only reference videos the library knows about.
//! The directory answers that question without exposing how videos are
//! stored or ingested.

use crate::error::Result;
use crate::types::VideoId;
use async_trait::async_trait;
use std::collections::HashSet;

/// Lookup of known video ids
#[async_trait]
pub trait VideoDirectory: Send + Sync {
    /// Return the subset of `ids` that exist
    async fn exists_all(&self, ids: &[VideoId]) -> Result<HashSet<VideoId>>;
}

/// Ids from `requested` that are absent from `found`, sorted and unique
pub fn missing_ids(requested: &[VideoId], found: &HashSet<VideoId>) -> Vec<VideoId> {
    let mut missing: Vec<VideoId> = requested
        .iter()
        .filter(|id| !found.contains(*id))
        .cloned()
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ids_sorted_and_deduplicated() {
        let requested = vec![
            VideoId::new("z"),
            VideoId::new("a"),
            VideoId::new("m"),
            VideoId::new("z"),
        ];
        let found: HashSet<VideoId> = [VideoId::new("m")].into_iter().collect();

        assert_eq!(
            missing_ids(&requested, &found),
            vec![VideoId::new("a"), VideoId::new("z")]
        );
    }
}
