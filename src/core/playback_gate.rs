//! Visibility-driven play/pause.
//!
//! Each item reports the fraction of its area on screen. Above the policy
//! threshold the item plays, otherwise it is paused and rewound. This runs
//! independently of the current index so a fast scroll can never leave an
//! off-screen item playing.

use log::trace;

use crate::core::resource_window::ResourceWindow;
use crate::entities::PolicyViolation;

/// Decision taken for one visibility sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Play,
    PauseAndRewind,
}

#[derive(Debug, Clone, Copy)]
pub struct PlaybackGate {
    threshold: f32,
}

impl PlaybackGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Pure decision for a visible fraction. Fractions outside `[0, 1]` are
    /// clamped; NaN yields `None`.
    pub fn decide(&self, fraction: f32) -> Option<GateDecision> {
        if fraction.is_nan() {
            return None;
        }
        if fraction.clamp(0.0, 1.0) > self.threshold {
            Some(GateDecision::Play)
        } else {
            Some(GateDecision::PauseAndRewind)
        }
    }

    /// Apply a visibility sample for `index` to the window.
    pub fn on_visibility_changed(
        &self,
        window: &mut ResourceWindow,
        index: usize,
        fraction: f32,
    ) -> Option<GateDecision> {
        let Some(decision) = self.decide(fraction) else {
            PolicyViolation::InvalidVisibility(fraction).report();
            return None;
        };
        let applied = window.set_playing(index, decision == GateDecision::Play);
        trace!(
            "PlaybackGate: index {} visible {:.2} -> {:?} (applied: {})",
            index, fraction, decision, applied
        );
        Some(decision)
    }
}
