//! Test doubles shared by the core unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::entities::{
    DataSource, FeedItem, FetchError, InitError, MediaId, PlaybackEngine, WorkerPool,
};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub fn item(i: usize) -> FeedItem {
    FeedItem::new(
        format!("v{}", i),
        format!("https://cdn.test/{}.mp4", i),
        format!("https://cdn.test/{}.jpg", i),
    )
}

pub fn items(range: Range<usize>) -> Vec<FeedItem> {
    range.map(item).collect()
}

/// Scripted pages; an exhausted script returns empty pages (end of feed).
#[derive(Default)]
pub struct RecordingSource {
    script: Mutex<VecDeque<Result<Vec<FeedItem>, FetchError>>>,
    calls: Mutex<Vec<(u32, u32)>>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, page: Vec<FeedItem>) {
        self.script.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self, message: &str) {
        self.script.lock().unwrap().push_back(Err(FetchError::new(message)));
    }

    pub fn calls(&self) -> Vec<(u32, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DataSource for RecordingSource {
    fn fetch(&self, page: u32, limit: u32) -> Result<Vec<FeedItem>, FetchError> {
        self.calls.lock().unwrap().push((page, limit));
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Queues jobs until the test runs them.
#[derive(Default)]
pub struct ManualPool {
    jobs: Mutex<VecDeque<Job>>,
}

impl ManualPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn take_next(&self) -> Option<Job> {
        self.jobs.lock().unwrap().pop_front()
    }

    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while let Some(job) = self.take_next() {
            job();
            ran += 1;
        }
        ran
    }
}

impl WorkerPool for ManualPool {
    fn execute(&self, job: Job) {
        self.jobs.lock().unwrap().push_back(job);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Open(String),
    Play(MediaId),
    Pause(MediaId),
    Seek(MediaId),
    Rate(MediaId, f32),
    Release(MediaId),
}

/// Playback engine that records calls and enforces the release ordering.
#[derive(Default)]
pub struct RecordingEngine {
    next_id: AtomicU64,
    calls: Mutex<Vec<EngineCall>>,
    failing: Mutex<HashSet<String>>,
    urls: Mutex<HashMap<MediaId, String>>,
    playing: Mutex<HashSet<MediaId>>,
    released: Mutex<Vec<String>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_url(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn open_count(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, EngineCall::Open(u) if u == url))
            .count()
    }

    /// Opened and not yet released
    pub fn live_count(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn released_urls(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }

    pub fn playing_count(&self) -> usize {
        self.playing.lock().unwrap().len()
    }

    pub fn url_of(&self, media: MediaId) -> Option<String> {
        self.urls.lock().unwrap().get(&media).cloned()
    }

    pub fn is_playing_url(&self, url: &str) -> bool {
        let urls = self.urls.lock().unwrap();
        self.playing
            .lock()
            .unwrap()
            .iter()
            .any(|m| urls.get(m).is_some_and(|u| u == url))
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PlaybackEngine for RecordingEngine {
    fn open(&self, url: &str) -> Result<MediaId, InitError> {
        self.record(EngineCall::Open(url.to_string()));
        if self.failing.lock().unwrap().contains(url) {
            return Err(InitError::new(format!("cannot decode {}", url)));
        }
        let media = MediaId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.urls.lock().unwrap().insert(media, url.to_string());
        Ok(media)
    }

    fn play(&self, media: MediaId) {
        self.record(EngineCall::Play(media));
        self.playing.lock().unwrap().insert(media);
    }

    fn pause(&self, media: MediaId) {
        self.record(EngineCall::Pause(media));
        self.playing.lock().unwrap().remove(&media);
    }

    fn seek_to_start(&self, media: MediaId) {
        self.record(EngineCall::Seek(media));
    }

    fn set_rate(&self, media: MediaId, multiplier: f32) {
        self.record(EngineCall::Rate(media, multiplier));
    }

    fn release(&self, media: MediaId) {
        assert!(
            !self.playing.lock().unwrap().contains(&media),
            "released {:?} while playing",
            media
        );
        self.record(EngineCall::Release(media));
        if let Some(url) = self.urls.lock().unwrap().remove(&media) {
            self.released.lock().unwrap().push(url);
        }
    }
}
