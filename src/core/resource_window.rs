//! Bounded window of media handles keyed by feed index.
//!
//! Arena: `IndexMap<usize, ResourceHandle>`, at most one handle per index.
//! Every removal goes through `evict()`, which disposes the handle
//! (pause -> seek-to-start -> release) before dropping it.
//!
//! # Window shape
//! For current index `c`, the preload set is `[c - behind, c + ahead]`
//! clipped to the feed. On an index change:
//! - handles farther than `evict_distance` are disposed immediately
//! - handles inside `evict_distance` but outside the preload set are parked
//!   and disposed once no handle is initializing (the window has settled)
//!
//! So the window holds at most `2 * evict_distance + 1` handles during a
//! transition and settles to the preload set.
//!
//! # Async opens
//! `open()` runs on the worker pool. Outcomes come back through a channel and
//! are applied by `poll()` on the owning thread:
//! - handle still present: registered as `Ready`, played only if it is the
//!   current index at that moment
//! - handle evicted/replaced, or window torn down since: resource released

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::ops::RangeInclusive;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::epoch::Epoch;
use crate::core::event_bus::EventEmitter;
use crate::core::feed_events::{HandleStatus, HandleStatusEvent};
use crate::entities::{
    FeedItem, HandleInfo, InitError, Lifecycle, MediaId, PlaybackEngine, PolicyViolation,
    ResourceHandle, WindowPolicy, WorkerPool,
};

/// Counters for monitoring window churn
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// open() calls scheduled
    pub opens: u64,
    /// Handles removed from the window
    pub evictions: u64,
    pub init_failures: u64,
    /// Opens that completed after their handle was gone
    pub orphaned: u64,
}

struct InitOutcome {
    epoch: u64,
    index: usize,
    handle: Uuid,
    result: Result<MediaId, InitError>,
}

/// Owns every media handle of the feed.
pub struct ResourceWindow {
    engine: Arc<dyn PlaybackEngine>,
    pool: Arc<dyn WorkerPool>,
    policy: WindowPolicy,
    handles: IndexMap<usize, ResourceHandle>,
    current: Option<usize>,
    preload: Option<RangeInclusive<usize>>,
    epoch: Epoch,
    tx: Sender<InitOutcome>,
    rx: Receiver<InitOutcome>,
    emitter: EventEmitter,
    stats: WindowStats,
}

impl ResourceWindow {
    pub fn new(engine: Arc<dyn PlaybackEngine>, pool: Arc<dyn WorkerPool>, policy: WindowPolicy) -> Self {
        let policy = match policy.validate() {
            Ok(()) => policy,
            Err(msg) => {
                PolicyViolation::InvalidPolicy(msg).report();
                // Release builds fall back to the defaults
                WindowPolicy::default()
            }
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        debug!("ResourceWindow created: {:?}", policy);
        Self {
            engine,
            pool,
            policy,
            handles: IndexMap::new(),
            current: None,
            preload: None,
            epoch: Epoch::new("window"),
            tx,
            rx,
            emitter: EventEmitter::detached(),
            stats: WindowStats::default(),
        }
    }

    /// Publish per-handle status as [`HandleStatusEvent`]s.
    pub fn with_emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn policy(&self) -> &WindowPolicy {
        &self.policy
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    /// No handles at all (live or failed)
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle(&self, index: usize) -> Option<HandleInfo> {
        self.handles.get(&index).map(ResourceHandle::info)
    }

    pub fn lifecycle(&self, index: usize) -> Option<Lifecycle> {
        self.handles.get(&index).map(ResourceHandle::lifecycle)
    }

    /// Sorted indices whose handle is not `Disposed`
    pub fn live_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .handles
            .iter()
            .filter(|(_, h)| h.is_live())
            .map(|(i, _)| *i)
            .collect();
        indices.sort_unstable();
        indices
    }

    pub fn playing_indices(&self) -> Vec<usize> {
        self.handles
            .iter()
            .filter(|(_, h)| h.lifecycle() == Lifecycle::Playing)
            .map(|(i, _)| *i)
            .collect()
    }

    /// Any open() still outstanding
    pub fn has_pending_inits(&self) -> bool {
        self.handles.values().any(|h| h.lifecycle() == Lifecycle::Initializing)
    }

    /// Move the window to `new_index`.
    ///
    /// Pauses the previous item, plays the new one (as soon as it is ready),
    /// schedules preloads and evicts far handles.
    pub fn on_index_changed(&mut self, new_index: usize, items: &[FeedItem]) {
        if new_index >= items.len() {
            PolicyViolation::IndexOutOfRange {
                index: new_index,
                len: items.len(),
            }
            .report();
            return;
        }

        let previous = self.current.replace(new_index);
        if let Some(prev) = previous.filter(|&p| p != new_index) {
            if let Some(handle) = self.handles.get_mut(&prev) {
                handle.pause_and_rewind(&*self.engine);
            }
        }

        self.acquire(new_index, &items[new_index].media_url);
        self.start_playing(new_index);

        let range = self.policy.preload_range(new_index, items.len());
        for index in range.clone() {
            if index != new_index {
                self.acquire(index, &items[index].media_url);
            }
        }
        self.preload = Some(range);

        let far: Vec<usize> = self
            .handles
            .keys()
            .copied()
            .filter(|&i| self.policy.should_evict(i, new_index))
            .collect();
        for index in far {
            self.evict(index);
        }

        debug!(
            "ResourceWindow: index {:?} -> {}, handles {:?}",
            previous,
            new_index,
            self.live_indices()
        );
        self.try_settle();
    }

    /// Re-apply the preload range after the feed grew. Playback is untouched.
    pub fn refresh_preload(&mut self, items: &[FeedItem]) {
        let Some(current) = self.current.filter(|&c| c < items.len()) else {
            return;
        };
        let range = self.policy.preload_range(current, items.len());
        if self.preload.as_ref() == Some(&range) {
            return;
        }
        for index in range.clone() {
            self.acquire(index, &items[index].media_url);
        }
        self.preload = Some(range);
    }

    /// Get or create the handle for `index`.
    ///
    /// Idempotent: an existing handle (in any state, including in-flight) is
    /// returned unchanged and no second open() is issued.
    pub fn acquire(&mut self, index: usize, url: &str) -> Uuid {
        if let Some(existing) = self.handles.get(&index) {
            return existing.id();
        }

        let mut handle = ResourceHandle::new(index, url);
        handle.begin_init();
        let id = handle.id();
        self.handles.insert(index, handle);
        self.spawn_open(index, id, url.to_string());
        id
    }

    fn spawn_open(&mut self, index: usize, handle: Uuid, url: String) {
        self.stats.opens += 1;
        let epoch = self.epoch.current();
        let engine = Arc::clone(&self.engine);
        let window_epoch = self.epoch.clone();
        let tx = self.tx.clone();

        let job = self.epoch.guard(epoch, move || {
            let result = engine.open(&url);
            if let Ok(media) = result {
                if !window_epoch.is_current(epoch) {
                    engine.release(media);
                    return;
                }
            }
            if let Err(crossbeam_channel::SendError(outcome)) = tx.send(InitOutcome {
                epoch,
                index,
                handle,
                result,
            }) {
                // Window is gone
                if let Ok(media) = outcome.result {
                    engine.release(media);
                }
            }
        });
        self.pool.execute(job);
    }

    /// Apply completed opens. Returns how many outcomes were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply_outcome(outcome);
            applied += 1;
        }
        if applied > 0 {
            self.try_settle();
        }
        applied
    }

    fn apply_outcome(&mut self, outcome: InitOutcome) {
        let InitOutcome {
            epoch,
            index,
            handle: id,
            result,
        } = outcome;

        let stale = !self.epoch.is_current(epoch);
        let slot = if stale {
            None
        } else {
            self.handles.get_mut(&index).filter(|h| h.id() == id)
        };

        let Some(handle) = slot else {
            if let Ok(media) = result {
                debug!("ResourceWindow: releasing orphaned open for index {}", index);
                self.stats.orphaned += 1;
                self.engine.release(media);
            }
            return;
        };

        match result {
            Ok(media) => {
                handle.complete_init(media);
                self.emitter.emit(HandleStatusEvent {
                    index,
                    handle: id,
                    status: HandleStatus::Ready,
                });
                if self.current == Some(index) {
                    self.start_playing(index);
                }
            }
            Err(err) => {
                warn!("ResourceWindow: index {} failed to initialize: {}", index, err);
                let message = err.message().to_string();
                handle.fail_init(err);
                self.stats.init_failures += 1;
                self.emitter.emit(HandleStatusEvent {
                    index,
                    handle: id,
                    status: HandleStatus::Failed { message },
                });
            }
        }
    }

    /// Play or pause-and-rewind the handle at `index`.
    ///
    /// No-op unless the handle is `Ready`, `Playing` or `Paused`.
    pub fn set_playing(&mut self, index: usize, playing: bool) -> bool {
        if playing {
            return self.start_playing(index);
        }
        match self.handles.get_mut(&index) {
            Some(handle) => handle.pause_and_rewind(&*self.engine),
            None => false,
        }
    }

    fn start_playing(&mut self, index: usize) -> bool {
        let controllable = self
            .handles
            .get(&index)
            .is_some_and(|h| h.lifecycle().is_controllable());
        if !controllable {
            return false;
        }

        // At most one handle plays at a time
        for (other, handle) in self.handles.iter_mut() {
            if *other != index {
                handle.pause_and_rewind(&*self.engine);
            }
        }

        self.handles
            .get_mut(&index)
            .is_some_and(|h| h.play(&*self.engine))
    }

    /// Temporary playback-rate override (hold-to-speed-up). Reverting to 1.0
    /// is up to the caller.
    pub fn set_speed(&mut self, index: usize, multiplier: f32) -> bool {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            PolicyViolation::InvalidSpeed(multiplier).report();
            return false;
        }
        self.handles
            .get_mut(&index)
            .is_some_and(|h| h.set_rate(&*self.engine, multiplier))
    }

    /// Dispose every handle and forget the current index. In-flight opens
    /// are released when they complete.
    pub fn teardown(&mut self) {
        self.epoch.bump();
        let count = self.handles.len();
        let indices: Vec<usize> = self.handles.keys().copied().collect();
        for index in indices {
            self.evict(index);
        }
        self.current = None;
        self.preload = None;

        // Everything queued is now stale and gets released
        while let Ok(outcome) = self.rx.try_recv() {
            self.apply_outcome(outcome);
        }
        info!("ResourceWindow: torn down ({} handles)", count);
    }

    fn evict(&mut self, index: usize) {
        let Some(mut handle) = self.handles.shift_remove(&index) else {
            return;
        };
        handle.dispose(&*self.engine);
        self.stats.evictions += 1;
        self.emitter.emit(HandleStatusEvent {
            index,
            handle: handle.id(),
            status: HandleStatus::Released,
        });
    }

    /// Dispose parked handles once nothing is initializing.
    fn try_settle(&mut self) {
        let (Some(current), Some(range)) = (self.current, self.preload.clone()) else {
            return;
        };
        if self.has_pending_inits() {
            return;
        }
        let parked: Vec<usize> = self
            .handles
            .keys()
            .copied()
            .filter(|i| *i != current && !range.contains(i))
            .collect();
        if !parked.is_empty() {
            debug!("ResourceWindow: settling, releasing {:?}", parked);
        }
        for index in parked {
            self.evict(index);
        }
    }
}

impl Drop for ResourceWindow {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventBus;
    use crate::core::event_bus::downcast_event;
    use crate::core::test_support::{items, EngineCall, ManualPool, RecordingEngine};
    use crate::core::workers::{InlinePool, Workers};
    use std::time::{Duration, Instant};

    fn url(i: usize) -> String {
        format!("https://cdn.test/{}.mp4", i)
    }

    fn window(engine: &Arc<RecordingEngine>, pool: Arc<dyn WorkerPool>) -> ResourceWindow {
        ResourceWindow::new(
            Arc::clone(engine) as Arc<dyn PlaybackEngine>,
            pool,
            WindowPolicy::default(),
        )
    }

    fn is_contiguous(indices: &[usize]) -> bool {
        indices.windows(2).all(|w| w[1] == w[0] + 1)
    }

    #[test]
    fn test_acquire_idempotent() {
        let engine = Arc::new(RecordingEngine::new());
        let pool = Arc::new(ManualPool::new());
        let mut window = window(&engine, pool.clone());

        let first = window.acquire(5, &url(5));
        let second = window.acquire(5, &url(5));
        assert_eq!(first, second);
        assert_eq!(window.lifecycle(5), Some(Lifecycle::Initializing));
        assert_eq!(pool.pending(), 1);

        pool.run_all();
        window.poll();
        assert_eq!(window.acquire(5, &url(5)), first);
        assert_eq!(engine.open_count(&url(5)), 1);
        assert_eq!(window.lifecycle(5), Some(Lifecycle::Ready));
    }

    #[test]
    fn test_scroll_settles_to_preload_set() {
        let engine = Arc::new(RecordingEngine::new());
        let mut window = window(&engine, Arc::new(InlinePool));
        let feed = items(0..10);

        for i in 0..=3 {
            window.on_index_changed(i, &feed);
            window.poll();
        }

        assert_eq!(window.live_indices(), vec![2, 3, 4, 5]);
        assert!(window.handle(0).is_none());
        assert!(engine.released_urls().contains(&url(0)));
        assert!(engine.released_urls().contains(&url(1)));
        assert_eq!(engine.live_count(), 4);
        assert_eq!(window.playing_indices(), vec![3]);
        assert!(engine.is_playing_url(&url(3)));
    }

    #[test]
    fn test_window_bound_over_random_walk() {
        let engine = Arc::new(RecordingEngine::new());
        let mut window = window(&engine, Arc::new(InlinePool));
        let feed = items(0..25);
        let policy = WindowPolicy::default();

        // Deterministic LCG walk: swipes of -2..=+3 plus occasional jumps
        let mut seed: u64 = 0x5eed;
        let mut index: usize = 0;
        for step in 0..300 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let delta = (seed >> 33) % 6;
            index = if step % 37 == 0 {
                ((seed >> 40) % 25) as usize
            } else {
                (index as i64 + delta as i64 - 2).clamp(0, 24) as usize
            };

            window.on_index_changed(index, &feed);
            assert!(window.live_indices().len() <= policy.transient_capacity());

            window.poll();
            let live = window.live_indices();
            assert!(live.len() <= policy.settled_capacity(), "step {}: {:?}", step, live);
            assert!(live.contains(&index));
            assert!(is_contiguous(&live), "step {}: {:?}", step, live);
            assert!(engine.playing_count() <= 1);
            assert_eq!(window.playing_indices(), vec![index]);
            assert_eq!(engine.live_count(), live.len());
        }
    }

    #[test]
    fn test_previous_paused_and_rewound() {
        let engine = Arc::new(RecordingEngine::new());
        let mut window = window(&engine, Arc::new(InlinePool));
        let feed = items(0..10);

        window.on_index_changed(0, &feed);
        window.poll();
        assert_eq!(window.lifecycle(0), Some(Lifecycle::Playing));

        let before = engine.calls().len();
        window.on_index_changed(1, &feed);
        let calls = engine.calls()[before..].to_vec();
        let pause = calls.iter().position(|c| matches!(c, EngineCall::Pause(_))).unwrap();
        assert!(matches!(calls[pause + 1], EngineCall::Seek(_)));
        assert_eq!(window.lifecycle(0), Some(Lifecycle::Paused));
        assert_eq!(window.playing_indices(), vec![1]);
    }

    #[test]
    fn test_superseded_init_registers_without_playing() {
        let engine = Arc::new(RecordingEngine::new());
        let pool = Arc::new(ManualPool::new());
        let mut window = window(&engine, pool.clone());
        let feed = items(0..10);

        window.on_index_changed(0, &feed);
        window.on_index_changed(1, &feed);
        pool.run_all();
        window.poll();

        assert_eq!(window.lifecycle(0), Some(Lifecycle::Ready));
        assert_eq!(window.lifecycle(1), Some(Lifecycle::Playing));
        assert_eq!(engine.playing_count(), 1);
        assert!(engine.is_playing_url(&url(1)));
    }

    #[test]
    fn test_evicted_while_initializing_is_released() {
        let engine = Arc::new(RecordingEngine::new());
        let pool = Arc::new(ManualPool::new());
        let mut window = window(&engine, pool.clone());
        let feed = items(0..10);

        window.on_index_changed(0, &feed);
        window.on_index_changed(9, &feed);
        assert!(window.handle(0).is_none());

        pool.run_all();
        window.poll();

        assert_eq!(window.stats().orphaned, 3);
        assert_eq!(window.live_indices(), vec![8, 9]);
        assert_eq!(engine.live_count(), 2);
    }

    #[test]
    fn test_init_failure_isolated() {
        let engine = Arc::new(RecordingEngine::new());
        engine.fail_url(&url(1));
        let bus = EventBus::new();
        let mut window = window(&engine, Arc::new(InlinePool)).with_emitter(bus.emitter());
        let feed = items(0..10);

        window.on_index_changed(0, &feed);
        window.poll();

        let failed = window.handle(1).unwrap();
        assert_eq!(failed.lifecycle, Lifecycle::Disposed);
        assert!(failed.error.is_some());
        assert_eq!(window.live_indices(), vec![0, 2]);
        assert_eq!(window.stats().init_failures, 1);

        let statuses: Vec<HandleStatusEvent> = bus
            .poll()
            .iter()
            .filter_map(|e| downcast_event::<HandleStatusEvent>(e).cloned())
            .collect();
        assert!(statuses.iter().any(|s| s.index == 1
            && matches!(&s.status, HandleStatus::Failed { message } if message.contains("cannot decode"))));

        // Swiping onto the failed item neither crashes nor reopens it
        window.on_index_changed(1, &feed);
        window.poll();
        assert!(!window.set_playing(1, true));
        assert_eq!(engine.open_count(&url(1)), 1);
        assert_eq!(window.live_indices(), vec![0, 2, 3]);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let engine = Arc::new(RecordingEngine::new());
        let pool = Arc::new(ManualPool::new());
        let mut window = window(&engine, pool.clone());
        let feed = items(0..10);

        window.on_index_changed(0, &feed);
        pool.run_all();
        window.poll();
        window.on_index_changed(1, &feed); // schedules index 3

        // One open completed but not yet applied, one not started
        window.on_index_changed(2, &feed); // schedules index 4
        pool.take_next().unwrap()();

        window.teardown();
        assert!(window.is_empty());
        assert_eq!(window.current_index(), None);
        assert_eq!(engine.live_count(), 0);

        pool.run_all();
        window.poll();
        assert_eq!(engine.open_count(&url(4)), 0);
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn test_drop_releases_everything() {
        let engine = Arc::new(RecordingEngine::new());
        {
            let mut window = window(&engine, Arc::new(InlinePool));
            window.on_index_changed(0, &items(0..10));
            window.poll();
            assert_eq!(engine.live_count(), 3);
        }
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn test_open_finishing_after_drop_is_released() {
        let engine = Arc::new(RecordingEngine::new());
        let pool = Arc::new(ManualPool::new());
        let mut window = window(&engine, pool.clone());

        window.acquire(3, &url(3));
        let pending = pool.take_next().unwrap();
        // Handle gone without a teardown: the epoch is still current
        window.evict(3);
        drop(window);

        pending();
        assert_eq!(engine.open_count(&url(3)), 1);
        assert_eq!(engine.live_count(), 0);
        assert!(engine.released_urls().contains(&url(3)));
    }

    #[test]
    fn test_open_queued_at_drop_is_skipped() {
        let engine = Arc::new(RecordingEngine::new());
        let pool = Arc::new(ManualPool::new());
        let mut window = window(&engine, pool.clone());

        window.on_index_changed(0, &items(0..10));
        drop(window);

        assert_eq!(pool.run_all(), 3);
        assert_eq!(engine.calls().len(), 0);
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn test_scroll_on_worker_threads() {
        let engine = Arc::new(RecordingEngine::new());
        let workers = Arc::new(Workers::new(2).unwrap());
        let mut window = window(&engine, workers.clone());
        let feed = items(0..20);
        let policy = WindowPolicy::default();

        let settle = |window: &mut ResourceWindow| {
            let deadline = Instant::now() + Duration::from_secs(5);
            while window.has_pending_inits() {
                assert!(Instant::now() < deadline, "opens did not complete");
                window.poll();
                std::thread::sleep(Duration::from_millis(1));
            }
        };

        for index in (0..20).chain((5..19).rev()) {
            window.on_index_changed(index, &feed);
            assert!(window.live_indices().len() <= policy.transient_capacity());
            settle(&mut window);
            let live = window.live_indices();
            assert!(live.len() <= policy.settled_capacity(), "index {}: {:?}", index, live);
            assert_eq!(window.playing_indices(), vec![index]);
        }

        window.teardown();
        drop(window);
        // Joins the threads, so every open has finished
        drop(workers);
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.playing_count(), 0);
    }

    #[test]
    fn test_set_playing_requires_ready() {
        let engine = Arc::new(RecordingEngine::new());
        let pool = Arc::new(ManualPool::new());
        let mut window = window(&engine, pool.clone());

        assert!(!window.set_playing(3, true));
        window.acquire(3, &url(3));
        assert!(!window.set_playing(3, true));

        pool.run_all();
        window.poll();
        assert!(window.set_playing(3, true));
        assert!(window.set_playing(3, false));
        assert_eq!(window.lifecycle(3), Some(Lifecycle::Paused));
        // Paused again: nothing to do
        assert!(!window.set_playing(3, false));
    }

    #[test]
    fn test_refresh_preload_after_append() {
        let engine = Arc::new(RecordingEngine::new());
        let mut window = window(&engine, Arc::new(InlinePool));

        window.on_index_changed(9, &items(0..10));
        window.poll();
        assert_eq!(window.live_indices(), vec![8, 9]);
        window.set_playing(9, false);

        window.refresh_preload(&items(0..20));
        window.poll();
        assert_eq!(window.live_indices(), vec![8, 9, 10, 11]);
        // Paused item stays paused
        assert_eq!(window.lifecycle(9), Some(Lifecycle::Paused));
    }

    #[test]
    fn test_set_speed() {
        let engine = Arc::new(RecordingEngine::new());
        let mut window = window(&engine, Arc::new(InlinePool));
        let feed = items(0..10);
        window.on_index_changed(0, &feed);
        window.poll();

        assert!(window.set_speed(0, 2.0));
        assert_eq!(window.handle(0).unwrap().rate, 2.0);
        assert!(window.set_speed(0, 1.0));
        assert!(!window.set_speed(7, 2.0));
        assert!(engine.calls().iter().any(|c| matches!(c, EngineCall::Rate(_, r) if *r == 2.0)));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "policy violation")]
    fn test_out_of_range_index_asserts() {
        let engine = Arc::new(RecordingEngine::new());
        let mut window = window(&engine, Arc::new(InlinePool));
        window.on_index_changed(10, &items(0..10));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "policy violation")]
    fn test_invalid_policy_asserts() {
        let engine = Arc::new(RecordingEngine::new());
        let policy = WindowPolicy {
            preload_ahead: 3,
            evict_distance: 1,
            ..Default::default()
        };
        ResourceWindow::new(engine as Arc<dyn PlaybackEngine>, Arc::new(InlinePool), policy);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_invalid_policy_falls_back_to_defaults() {
        let engine = Arc::new(RecordingEngine::new());
        let policy = WindowPolicy {
            preload_ahead: 3,
            evict_distance: 1,
            ..Default::default()
        };
        let window =
            ResourceWindow::new(engine as Arc<dyn PlaybackEngine>, Arc::new(InlinePool), policy);
        assert_eq!(window.policy(), &WindowPolicy::default());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "policy violation")]
    fn test_invalid_speed_asserts() {
        let engine = Arc::new(RecordingEngine::new());
        let mut window = window(&engine, Arc::new(InlinePool));
        window.set_speed(0, f32::NAN);
    }
}
