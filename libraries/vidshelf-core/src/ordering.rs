//! Pure list rules shared by every playlist writer
//!
//! Positions in storage are dense: a playlist with `n` members uses exactly
//! the positions `0..n`. The helpers here decide *where* things go; the
//! storage layer does the row shuffling.

use crate::error::{Result, VidshelfError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::hash::Hash;

/// Drop repeated items, keeping the first occurrence and the input order
pub fn dedup_first<T: Eq + Hash + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert((*item).clone()))
        .cloned()
        .collect()
}

/// Insert slot for a list of `len` entries. `None` appends; anything past
/// the end is clamped to the end.
pub fn insert_slot(position: Option<u32>, len: usize) -> usize {
    position.map_or(len, |p| (p as usize).min(len))
}

/// Target index for moving an existing entry inside a list of `len`
/// entries (`len > 0`).
pub fn move_slot(position: u32, len: usize) -> usize {
    (position as usize).min(len.saturating_sub(1))
}

/// Randomly permute `items`. With a valid `anchor`, everything up to and
/// including the anchor stays put and only the tail after it is permuted.
pub fn shuffle_after_anchor<T, R>(items: &mut [T], anchor: Option<u32>, rng: &mut R)
where
    R: Rng + ?Sized,
{
    if items.len() <= 1 {
        return;
    }
    match anchor {
        Some(anchor) if (anchor as usize) < items.len() => {
            items[anchor as usize + 1..].shuffle(rng);
        }
        _ => items.shuffle(rng),
    }
}

/// Check that `positions` (ascending) are exactly `0..positions.len()`
pub fn ensure_contiguous(positions: &[i64]) -> Result<()> {
    for (expected, actual) in positions.iter().enumerate() {
        if *actual != expected as i64 {
            return Err(VidshelfError::invariant(format!(
                "expected position {} but found {}",
                expected, actual
            )));
        }
    }
    Ok(())
}
