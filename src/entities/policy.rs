//! Window policy: preload/evict radii and the auto-play visibility threshold.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Preload/evict radii around the current index.
///
/// Defaults: 2 ahead, 1 behind, evict beyond distance 2, play above 70%
/// visibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPolicy {
    pub preload_ahead: usize,
    pub preload_behind: usize,
    /// Handles with `|index - current| > evict_distance` are disposed immediately
    pub evict_distance: usize,
    /// Visible fraction required to auto-play
    pub playability_threshold: f32,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            preload_ahead: 2,
            preload_behind: 1,
            evict_distance: 2,
            playability_threshold: 0.7,
        }
    }
}

impl WindowPolicy {
    /// Indices to keep materialized around `current`, clipped to `[0, len)`.
    /// Empty when `len == 0`.
    pub fn preload_range(&self, current: usize, len: usize) -> RangeInclusive<usize> {
        if len == 0 {
            #[allow(clippy::reversed_empty_ranges)]
            return 1..=0;
        }
        let start = current.saturating_sub(self.preload_behind);
        let end = current.saturating_add(self.preload_ahead).min(len - 1);
        start..=end
    }

    /// True if a handle at `index` must be disposed when `current` is active.
    pub fn should_evict(&self, index: usize, current: usize) -> bool {
        index.abs_diff(current) > self.evict_distance
    }

    /// Upper bound of live handles once the window has settled.
    pub fn settled_capacity(&self) -> usize {
        self.preload_behind + self.preload_ahead + 1
    }

    /// Upper bound of live handles during a transition.
    pub fn transient_capacity(&self) -> usize {
        self.evict_distance * 2 + 1
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.playability_threshold > 0.0 && self.playability_threshold <= 1.0) {
            return Err(format!(
                "playability_threshold must be in (0, 1], got {}",
                self.playability_threshold
            ));
        }
        if self.evict_distance < self.preload_ahead.max(self.preload_behind) {
            return Err(format!(
                "evict_distance ({}) must cover preload radii (ahead {}, behind {})",
                self.evict_distance, self.preload_ahead, self.preload_behind
            ));
        }
        Ok(())
    }
}
