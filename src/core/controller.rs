//! Feed orchestrator.
//!
//! Owns the pagination engine, the resource window and the playback gate,
//! and wires them to the [`EventBus`]. Every public method is one `&mut self`
//! step on the UI thread; background completions are applied by [`pump`].
//!
//! [`pump`]: FeedController::pump

use log::{debug, info, warn};
use std::sync::Arc;

use crate::config::FeedConfig;
use crate::core::event_bus::EventBus;
use crate::core::feed_events::{CurrentIndexChangedEvent, WarmStartEvent};
use crate::core::pagination::{PaginationEngine, PaginationState};
use crate::core::playback_gate::{GateDecision, PlaybackGate};
use crate::core::resource_window::ResourceWindow;
use crate::entities::{
    CacheStore, DataSource, FeedSnapshot, PlaybackEngine, PolicyViolation, WorkerPool,
};

pub struct FeedController {
    pagination: PaginationEngine,
    window: ResourceWindow,
    gate: PlaybackGate,
    bus: EventBus,
    cache: Option<Arc<dyn CacheStore>>,
    page_size: u32,
    hold_speed: f32,
    current: Option<usize>,
    /// Generation whose first page was written to the cache
    cached_generation: Option<u64>,
    /// Set by `teardown`: late pages must not reacquire media
    closed: bool,
}

impl FeedController {
    pub fn new(
        source: Arc<dyn DataSource>,
        engine: Arc<dyn PlaybackEngine>,
        pool: Arc<dyn WorkerPool>,
        config: &FeedConfig,
    ) -> Self {
        let bus = EventBus::new();
        let pagination =
            PaginationEngine::new(source, Arc::clone(&pool)).with_emitter(bus.emitter());
        let window = ResourceWindow::new(engine, pool, config.window)
            .with_emitter(bus.emitter());
        Self {
            pagination,
            window,
            gate: PlaybackGate::new(config.window.playability_threshold),
            bus,
            cache: None,
            page_size: config.page_size,
            hold_speed: config.hold_speed,
            current: None,
            cached_generation: None,
            closed: false,
        }
    }

    /// Enable warm start: cached items on startup, fresh first pages saved back.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn pagination_state(&self) -> &PaginationState {
        self.pagination.state()
    }

    pub fn items(&self) -> FeedSnapshot {
        self.pagination.items()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn window(&self) -> &ResourceWindow {
        &self.window
    }

    pub fn start(&mut self) {
        info!("FeedController: start (page size {})", self.page_size);
        self.refresh();
    }

    /// Drop every handle and reload the feed from page 1.
    pub fn refresh(&mut self) {
        self.window.teardown();
        self.current = None;
        self.closed = false;
        self.pagination.request_initial(self.page_size);
    }

    /// Publish cached items as a [`WarmStartEvent`]. Returns how many.
    pub fn warm_start(&mut self) -> anyhow::Result<usize> {
        let Some(cache) = &self.cache else {
            return Ok(0);
        };
        let items = cache.load()?;
        if !items.is_empty() {
            info!("FeedController: warm start with {} cached items", items.len());
            self.bus.emit(WarmStartEvent {
                items: Arc::from(items.clone()),
            });
        }
        Ok(items.len())
    }

    /// Apply background completions. Returns true if anything changed.
    pub fn pump(&mut self) -> bool {
        let paginated = self.pagination.poll();
        if paginated {
            self.on_pagination_changed();
        }
        let opened = self.window.poll();
        paginated || opened > 0
    }

    fn on_pagination_changed(&mut self) {
        let PaginationState::Loaded { items, .. } = self.pagination.state().clone() else {
            return;
        };
        if items.is_empty() {
            return;
        }

        match self.current {
            _ if self.closed => debug!("FeedController: closed, page not activated"),
            None if self.window.is_empty() => self.activate(0, &items),
            Some(_) => self.window.refresh_preload(&items),
            None => {}
        }

        let generation = self.pagination.generation();
        if self.cached_generation != Some(generation) {
            self.cached_generation = Some(generation);
            if let Some(cache) = &self.cache {
                let first_page = &items[..items.len().min(self.page_size as usize)];
                if let Err(e) = cache.save(first_page) {
                    warn!("FeedController: failed to save feed cache: {:#}", e);
                }
            }
        }
    }

    fn activate(&mut self, index: usize, items: &FeedSnapshot) {
        let old_index = self.current.replace(index);
        if old_index != Some(index) {
            self.bus.emit(CurrentIndexChangedEvent {
                old_index,
                new_index: index,
            });
        }
        self.window.on_index_changed(index, items);
    }

    /// The user settled on item `index`.
    ///
    /// Moves the window, then requests the next page when `index` is the
    /// last item and more pages are available.
    pub fn on_index_changed(&mut self, index: usize) {
        if self.closed {
            debug!("FeedController: closed, ignoring index {}", index);
            return;
        }
        let items = self.pagination.items();
        if index >= items.len() {
            PolicyViolation::IndexOutOfRange {
                index,
                len: items.len(),
            }
            .report();
            return;
        }

        self.activate(index, &items);

        if index + 1 == items.len()
            && self.pagination.state().can_request_next()
            && !self.pagination.is_fetch_pending()
        {
            debug!("FeedController: reached item {}, requesting next page", index);
            self.pagination.request_next(self.page_size);
        }
    }

    pub fn on_visibility_changed(&mut self, index: usize, fraction: f32) -> Option<GateDecision> {
        self.gate.on_visibility_changed(&mut self.window, index, fraction)
    }

    pub fn set_speed(&mut self, index: usize, multiplier: f32) -> bool {
        self.window.set_speed(index, multiplier)
    }

    /// Hold-to-speed-up pressed
    pub fn begin_speed_hold(&mut self, index: usize) -> bool {
        self.window.set_speed(index, self.hold_speed)
    }

    /// Hold released: back to normal rate
    pub fn end_speed_hold(&mut self, index: usize) -> bool {
        self.window.set_speed(index, 1.0)
    }

    /// Re-issue the failed page request.
    pub fn retry(&mut self) -> bool {
        self.pagination.retry()
    }

    /// Release every handle and end the session. Pages still in flight
    /// update the item list but never reacquire media; `refresh` reopens.
    pub fn teardown(&mut self) {
        self.window.teardown();
        self.current = None;
        self.closed = true;
    }
}
