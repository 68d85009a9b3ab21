//! Collaborator interfaces consumed by the feed core.
//!
//! Implementations live outside `core/` (see `sim` and `cache_store`), so the
//! engine and window are constructed with them explicitly.

use std::sync::Arc;

use super::errors::{FetchError, InitError};
use super::feed_item::FeedItem;

/// Opaque token for a resource opened by a [`PlaybackEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId(pub u64);

/// Backend page source.
///
/// Called on a worker thread. An empty page signals end of feed.
pub trait DataSource: Send + Sync {
    fn fetch(&self, page: u32, limit: u32) -> Result<Vec<FeedItem>, FetchError>;
}

/// Native media playback backend.
///
/// `open` runs on a worker thread; the rest are called from the owning thread.
pub trait PlaybackEngine: Send + Sync {
    fn open(&self, url: &str) -> Result<MediaId, InitError>;
    fn play(&self, media: MediaId);
    fn pause(&self, media: MediaId);
    fn seek_to_start(&self, media: MediaId);
    fn set_rate(&self, media: MediaId, multiplier: f32);
    fn release(&self, media: MediaId);
}

/// Warm-start item store. Not authoritative.
pub trait CacheStore: Send + Sync {
    fn save(&self, items: &[FeedItem]) -> anyhow::Result<()>;
    fn load(&self) -> anyhow::Result<Vec<FeedItem>>;
}

/// Background executor for fetches and media opens.
pub trait WorkerPool: Send + Sync {
    fn execute(&self, job: Box<dyn FnOnce() + Send + 'static>);
}

/// Blanket impls: Arc<T> implements traits if T does
impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    fn fetch(&self, page: u32, limit: u32) -> Result<Vec<FeedItem>, FetchError> {
        (**self).fetch(page, limit)
    }
}

impl<T: WorkerPool + ?Sized> WorkerPool for Arc<T> {
    fn execute(&self, job: Box<dyn FnOnce() + Send + 'static>) {
        (**self).execute(job)
    }
}
