//! Simulated collaborators for the `reelfeed` binary and integration use.
//!
//! - [`SyntheticSource`]: generated feed of a fixed length
//! - [`JsonFileSource`]: feed read from a JSON page file, served in pages
//! - [`SimulatedEngine`]: playback engine that only tracks resource counts

use anyhow::Context;
use log::{debug, trace};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::entities::{
    parse_page, DataSource, FeedItem, FetchError, InitError, MediaId, PlaybackEngine,
};

fn page_bounds(page: u32, limit: u32, total: usize) -> std::ops::Range<usize> {
    let limit = limit as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);
    start..end
}

/// Generated feed with `total` items.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    total: usize,
    latency: Duration,
}

impl SyntheticSource {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            latency: Duration::ZERO,
        }
    }

    /// Sleep this long in every fetch (runs on a worker).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl DataSource for SyntheticSource {
    fn fetch(&self, page: u32, limit: u32) -> Result<Vec<FeedItem>, FetchError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        let items: Vec<FeedItem> = page_bounds(page, limit, self.total)
            .map(|i| {
                FeedItem::new(
                    format!("clip-{:05}", i),
                    format!("https://media.reelfeed.test/{}.mp4", i),
                    format!("https://media.reelfeed.test/{}.jpg", i),
                )
            })
            .collect();
        trace!("SyntheticSource: page {} -> {} items", page, items.len());
        Ok(items)
    }
}

/// Feed loaded once from a JSON file and served page by page.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    items: Vec<FeedItem>,
}

impl JsonFileSource {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read feed: {}", path.display()))?;
        let items =
            parse_page(&raw).with_context(|| format!("Failed to parse feed: {}", path.display()))?;
        debug!("JsonFileSource: {} items from {}", items.len(), path.display());
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl DataSource for JsonFileSource {
    fn fetch(&self, page: u32, limit: u32) -> Result<Vec<FeedItem>, FetchError> {
        Ok(self.items[page_bounds(page, limit, self.items.len())].to_vec())
    }
}

/// Resource counters of a [`SimulatedEngine`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub opened: u64,
    pub released: u64,
    pub failed: u64,
    pub live: usize,
    pub peak_live: usize,
}

/// Playback engine without media: tracks live and playing resources.
#[derive(Debug, Default)]
pub struct SimulatedEngine {
    fail_every: Option<u64>,
    open_latency: Duration,
    attempts: AtomicU64,
    failed: AtomicU64,
    released: AtomicU64,
    peak_live: AtomicUsize,
    live: Mutex<HashSet<MediaId>>,
    playing: Mutex<HashSet<MediaId>>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `n`th open (0 disables).
    pub fn with_fail_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    pub fn with_open_latency(mut self, latency: Duration) -> Self {
        self.open_latency = latency;
        self
    }

    pub fn stats(&self) -> EngineStats {
        let failed = self.failed.load(Ordering::Relaxed);
        EngineStats {
            opened: self.attempts.load(Ordering::Relaxed) - failed,
            released: self.released.load(Ordering::Relaxed),
            failed,
            live: self.live.lock().unwrap_or_else(|e| e.into_inner()).len(),
            peak_live: self.peak_live.load(Ordering::Relaxed),
        }
    }

    pub fn playing_count(&self) -> usize {
        self.playing.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn open(&self, url: &str) -> Result<MediaId, InitError> {
        if !self.open_latency.is_zero() {
            std::thread::sleep(self.open_latency);
        }
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        if self.fail_every.is_some_and(|n| attempt % n == 0) {
            self.failed.fetch_add(1, Ordering::Relaxed);
            return Err(InitError::new(format!("simulated decoder failure: {}", url)));
        }

        let media = MediaId(attempt);
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        live.insert(media);
        self.peak_live.fetch_max(live.len(), Ordering::Relaxed);
        trace!("SimulatedEngine: open {} -> {:?}", url, media);
        Ok(media)
    }

    fn play(&self, media: MediaId) {
        self.playing.lock().unwrap_or_else(|e| e.into_inner()).insert(media);
    }

    fn pause(&self, media: MediaId) {
        self.playing.lock().unwrap_or_else(|e| e.into_inner()).remove(&media);
    }

    fn seek_to_start(&self, _media: MediaId) {}

    fn set_rate(&self, media: MediaId, multiplier: f32) {
        trace!("SimulatedEngine: {:?} rate {}", media, multiplier);
    }

    fn release(&self, media: MediaId) {
        if self.playing.lock().unwrap_or_else(|e| e.into_inner()).contains(&media) {
            log::error!("SimulatedEngine: {:?} released while playing", media);
        }
        if self.live.lock().unwrap_or_else(|e| e.into_inner()).remove(&media) {
            self.released.fetch_add(1, Ordering::Relaxed);
        }
    }
}
