//! Media resource handle and its lifecycle.
//!
//! A handle is owned by exactly one `ResourceWindow`. Every state change goes
//! through methods here so the release path is always pause -> seek -> release.

use log::trace;
use uuid::Uuid;

use super::errors::InitError;
use super::traits::{MediaId, PlaybackEngine};

/// Lifecycle of a single media resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initializing, // open() scheduled on a worker
    Ready,        // opened, never played or rate-only changes
    Playing,
    Paused,       // paused and rewound to start
    Disposed,     // released, or open() failed
}

impl Lifecycle {
    /// Has an underlying resource that accepts play/pause/seek/rate.
    pub fn is_controllable(self) -> bool {
        matches!(self, Lifecycle::Ready | Lifecycle::Playing | Lifecycle::Paused)
    }
}

/// Read-only copy of a handle for consumers
#[derive(Debug, Clone, PartialEq)]
pub struct HandleInfo {
    pub id: Uuid,
    pub index: usize,
    pub url: String,
    pub lifecycle: Lifecycle,
    pub rate: f32,
    pub error: Option<InitError>,
}

/// Owned media playback resource bound to one feed index
#[derive(Debug)]
pub struct ResourceHandle {
    id: Uuid,
    index: usize,
    url: String,
    lifecycle: Lifecycle,
    media: Option<MediaId>,
    rate: f32,
    error: Option<InitError>,
}

impl ResourceHandle {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            url: url.into(),
            lifecycle: Lifecycle::Uninitialized,
            media: None,
            rate: 1.0,
            error: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn error(&self) -> Option<&InitError> {
        self.error.as_ref()
    }

    /// Holds a resource that still needs releasing
    pub fn is_live(&self) -> bool {
        self.lifecycle != Lifecycle::Disposed
    }

    pub fn info(&self) -> HandleInfo {
        HandleInfo {
            id: self.id,
            index: self.index,
            url: self.url.clone(),
            lifecycle: self.lifecycle,
            rate: self.rate,
            error: self.error.clone(),
        }
    }

    pub(crate) fn begin_init(&mut self) {
        debug_assert_eq!(self.lifecycle, Lifecycle::Uninitialized);
        self.lifecycle = Lifecycle::Initializing;
    }

    /// Attach the opened resource. Only valid while initializing.
    pub(crate) fn complete_init(&mut self, media: MediaId) -> bool {
        if self.lifecycle != Lifecycle::Initializing {
            return false;
        }
        self.media = Some(media);
        self.lifecycle = Lifecycle::Ready;
        trace!("handle {} [{}] ready", self.index, self.id);
        true
    }

    pub(crate) fn fail_init(&mut self, err: InitError) {
        trace!("handle {} [{}] failed: {}", self.index, self.id, err);
        self.error = Some(err);
        self.lifecycle = Lifecycle::Disposed;
    }

    pub(crate) fn play(&mut self, engine: &dyn PlaybackEngine) -> bool {
        let Some(media) = self.media else {
            return false;
        };
        if !self.lifecycle.is_controllable() || self.lifecycle == Lifecycle::Playing {
            return false;
        }
        engine.play(media);
        self.lifecycle = Lifecycle::Playing;
        trace!("handle {} playing", self.index);
        true
    }

    /// Pause and rewind. A handle that never played is left alone.
    pub(crate) fn pause_and_rewind(&mut self, engine: &dyn PlaybackEngine) -> bool {
        let Some(media) = self.media else {
            return false;
        };
        if self.lifecycle != Lifecycle::Playing {
            return false;
        }
        engine.pause(media);
        engine.seek_to_start(media);
        self.lifecycle = Lifecycle::Paused;
        trace!("handle {} paused", self.index);
        true
    }

    pub(crate) fn set_rate(&mut self, engine: &dyn PlaybackEngine, multiplier: f32) -> bool {
        let Some(media) = self.media else {
            return false;
        };
        if !self.lifecycle.is_controllable() {
            return false;
        }
        engine.set_rate(media, multiplier);
        self.rate = multiplier;
        true
    }

    /// Release the underlying resource: pause -> seek-to-start -> release.
    pub(crate) fn dispose(&mut self, engine: &dyn PlaybackEngine) {
        if let Some(media) = self.media.take() {
            if self.lifecycle == Lifecycle::Playing {
                engine.pause(media);
                self.lifecycle = Lifecycle::Paused;
            }
            engine.seek_to_start(media);
            debug_assert_ne!(self.lifecycle, Lifecycle::Playing);
            engine.release(media);
        }
        self.lifecycle = Lifecycle::Disposed;
        trace!("handle {} [{}] disposed", self.index, self.id);
    }
}
