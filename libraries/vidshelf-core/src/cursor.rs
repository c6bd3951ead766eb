//! Playback cursor rules
//!
//! A playlist's `current_position` is an index into its ordered membership,
//! not a reference to a video. These rules keep the index inside
//! `[0, len)` (or `None`) as the list changes underneath it. Only `set`,
//! `remove` and `clear` move the cursor; insertions, moves and shuffles
//! leave the number alone even when a different video now sits there.

use crate::error::{Result, VidshelfError};

/// "Currently playing" index of a playlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCursor(Option<u32>);

impl PlaybackCursor {
    pub fn new(position: Option<u32>) -> Self {
        Self(position)
    }

    pub fn get(self) -> Option<u32> {
        self.0
    }

    /// Whole list replaced; a stale index past the new end is dropped.
    pub fn on_set(&mut self, new_len: usize) {
        if new_len == 0 {
            self.0 = None;
        } else if let Some(current) = self.0 {
            if current as usize >= new_len {
                self.0 = None;
            }
        }
    }

    /// Entry at `removed_index` deleted; `new_len` is the length afterwards.
    pub fn on_remove(&mut self, removed_index: u32, new_len: usize) {
        let Some(current) = self.0 else {
            return;
        };

        if new_len == 0 {
            self.0 = None;
        } else if removed_index < current {
            self.0 = Some(current - 1);
        } else if removed_index == current && current as usize >= new_len {
            // The playing entry was the last one: fall back to the new tail
            self.0 = Some((new_len - 1) as u32);
        }
    }

    pub fn on_clear(&mut self) {
        self.0 = None;
    }

    /// Explicit write, validated against a list of `len` entries.
    pub fn set(&mut self, value: Option<u32>, len: usize) -> Result<()> {
        if let Some(position) = value {
            if len == 0 {
                return Err(VidshelfError::PositionOutOfRange {
                    position,
                    max: None,
                });
            }
            let max = (len - 1) as u32;
            if position > max {
                return Err(VidshelfError::PositionOutOfRange {
                    position,
                    max: Some(max),
                });
            }
        }
        self.0 = value;
        Ok(())
    }

    /// Whether the cursor satisfies the bounds invariant for `len` entries
    pub fn is_valid_for(self, len: usize) -> bool {
        match self.0 {
            None => true,
            Some(position) => (position as usize) < len,
        }
    }
}
