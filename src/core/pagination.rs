//! Pagination state machine and the engine that drives it.
//!
//! [`PageMachine`] is a pure transition function `(state, PageEvent) -> effects`.
//! [`PaginationEngine`] owns a machine plus its collaborators: it runs
//! `Fetch` effects on the worker pool and publishes `Publish` effects.
//!
//! # Guarantees
//! - Single flight: at most one fetch in flight; `request_next` while
//!   loading is rejected, not queued.
//! - Generation guard: every `request_initial` starts a new generation; a
//!   result from an older generation is discarded when it arrives.
//! - Items only grow, or reset to empty on `request_initial`.
//! - `Failed` keeps the last good item list.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::core::epoch::Epoch;
use crate::core::event_bus::EventEmitter;
use crate::core::feed_events::PaginationChangedEvent;
use crate::entities::{DataSource, FeedItem, FeedSnapshot, FetchError, WorkerPool};

/// Observable pagination state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PaginationState {
    #[default]
    Idle,
    /// Fetch in flight; `snapshot` is the last known-good list
    Loading { snapshot: FeedSnapshot },
    Loaded { items: FeedSnapshot, has_reached_max: bool },
    /// Last fetch failed; `items` is the last known-good list
    Failed { message: String, items: FeedSnapshot },
}

impl PaginationState {
    /// Items visible in this state (empty for `Idle`)
    pub fn items(&self) -> FeedSnapshot {
        match self {
            PaginationState::Idle => empty_snapshot(),
            PaginationState::Loading { snapshot } => Arc::clone(snapshot),
            PaginationState::Loaded { items, .. } | PaginationState::Failed { items, .. } => {
                Arc::clone(items)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PaginationState::Loading { .. })
    }

    pub fn has_reached_max(&self) -> bool {
        matches!(self, PaginationState::Loaded { has_reached_max: true, .. })
    }

    /// `Loaded` with more pages to fetch
    pub fn can_request_next(&self) -> bool {
        matches!(self, PaginationState::Loaded { has_reached_max: false, .. })
    }
}

fn empty_snapshot() -> FeedSnapshot {
    Arc::from(Vec::<FeedItem>::new())
}

/// One page request, tagged with the generation that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub page: u32,
    pub limit: u32,
}

/// Inputs to the pagination state machine
#[derive(Debug, Clone)]
pub enum PageEvent {
    InitialRequested { generation: u64, limit: u32 },
    NextRequested { limit: u32 },
    RetryRequested,
    FetchCompleted {
        request: FetchRequest,
        result: Result<Vec<FeedItem>, FetchError>,
    },
}

/// Outputs of the pagination state machine
#[derive(Debug, Clone, PartialEq)]
pub enum PageEffect {
    Fetch(FetchRequest),
    Publish(PaginationState),
}

/// Pure pagination state machine
#[derive(Debug, Clone, Default)]
pub struct PageMachine {
    state: PaginationState,
    items: Option<FeedSnapshot>,
    generation: u64,
    /// Last page successfully appended (0 = none)
    loaded_page: u32,
    in_flight: Option<FetchRequest>,
    last_failed: Option<FetchRequest>,
}

impl PageMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> Option<FetchRequest> {
        self.in_flight
    }

    fn items(&self) -> FeedSnapshot {
        self.items.clone().unwrap_or_else(empty_snapshot)
    }

    fn start_fetch(&mut self, request: FetchRequest) -> Vec<PageEffect> {
        self.in_flight = Some(request);
        self.state = PaginationState::Loading { snapshot: self.items() };
        vec![PageEffect::Publish(self.state.clone()), PageEffect::Fetch(request)]
    }

    /// Apply one event and return the effects to run, in order.
    pub fn update(&mut self, event: PageEvent) -> Vec<PageEffect> {
        match event {
            PageEvent::InitialRequested { generation, limit } => {
                self.generation = generation;
                self.items = None;
                self.loaded_page = 0;
                self.last_failed = None;
                self.start_fetch(FetchRequest {
                    generation,
                    page: 1,
                    limit: limit.max(1),
                })
            }

            PageEvent::NextRequested { limit } => {
                if self.in_flight.is_some() || !self.state.can_request_next() {
                    debug!("request_next ignored in state {:?}", StateName(&self.state));
                    return Vec::new();
                }
                self.start_fetch(FetchRequest {
                    generation: self.generation,
                    page: self.loaded_page + 1,
                    limit: limit.max(1),
                })
            }

            PageEvent::RetryRequested => {
                let failed = match (&self.state, self.last_failed) {
                    (PaginationState::Failed { .. }, Some(failed)) if self.in_flight.is_none() => failed,
                    _ => {
                        debug!("retry ignored in state {:?}", StateName(&self.state));
                        return Vec::new();
                    }
                };
                self.last_failed = None;
                self.start_fetch(FetchRequest {
                    generation: self.generation,
                    ..failed
                })
            }

            PageEvent::FetchCompleted { request, result } => {
                if request.generation != self.generation || self.in_flight != Some(request) {
                    debug!(
                        "discarding stale page {} (generation {}, current {})",
                        request.page, request.generation, self.generation
                    );
                    return Vec::new();
                }
                self.in_flight = None;

                self.state = match result {
                    Ok(page_items) if page_items.is_empty() => {
                        info!("feed end reached after page {}", self.loaded_page);
                        PaginationState::Loaded {
                            items: self.items(),
                            has_reached_max: true,
                        }
                    }
                    Ok(page_items) => {
                        let mut items = self.items().to_vec();
                        items.extend(page_items);
                        let items: FeedSnapshot = Arc::from(items);
                        self.items = Some(Arc::clone(&items));
                        self.loaded_page = request.page;
                        PaginationState::Loaded {
                            items,
                            has_reached_max: false,
                        }
                    }
                    Err(err) => {
                        warn!("page {} failed: {}", request.page, err);
                        self.last_failed = Some(request);
                        PaginationState::Failed {
                            message: err.message().to_string(),
                            items: self.items(),
                        }
                    }
                };
                vec![PageEffect::Publish(self.state.clone())]
            }
        }
    }
}

/// Debug helper that prints only the state variant and item count.
struct StateName<'a>(&'a PaginationState);

impl std::fmt::Debug for StateName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            PaginationState::Idle => write!(f, "Idle"),
            PaginationState::Loading { snapshot } => write!(f, "Loading({})", snapshot.len()),
            PaginationState::Loaded { items, has_reached_max } => {
                write!(f, "Loaded({}, max={})", items.len(), has_reached_max)
            }
            PaginationState::Failed { items, .. } => write!(f, "Failed({})", items.len()),
        }
    }
}

struct PageResult {
    request: FetchRequest,
    result: Result<Vec<FeedItem>, FetchError>,
}

/// Owns the accumulated feed and issues page fetches.
pub struct PaginationEngine {
    machine: PageMachine,
    source: Arc<dyn DataSource>,
    pool: Arc<dyn WorkerPool>,
    generation: Epoch,
    tx: Sender<PageResult>,
    rx: Receiver<PageResult>,
    emitter: EventEmitter,
}

impl PaginationEngine {
    pub fn new(source: Arc<dyn DataSource>, pool: Arc<dyn WorkerPool>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            machine: PageMachine::new(),
            source,
            pool,
            generation: Epoch::new("pagination"),
            tx,
            rx,
            emitter: EventEmitter::detached(),
        }
    }

    /// Publish state transitions as [`PaginationChangedEvent`]s.
    pub fn with_emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn state(&self) -> &PaginationState {
        self.machine.state()
    }

    pub fn items(&self) -> FeedSnapshot {
        self.machine.state().items()
    }

    pub fn generation(&self) -> u64 {
        self.machine.generation()
    }

    pub fn is_fetch_pending(&self) -> bool {
        self.machine.in_flight().is_some()
    }

    /// Reset the feed and fetch page 1. Results of any earlier fetch are
    /// discarded when they arrive.
    pub fn request_initial(&mut self, page_size: u32) {
        let generation = self.generation.bump();
        info!("pagination: initial request (generation {}, limit {})", generation, page_size);
        self.dispatch(PageEvent::InitialRequested {
            generation,
            limit: page_size,
        });
    }

    /// Fetch the next page. Returns false (no-op) unless `Loaded` with more
    /// pages available and nothing in flight.
    pub fn request_next(&mut self, page_size: u32) -> bool {
        self.dispatch(PageEvent::NextRequested { limit: page_size })
    }

    /// Re-issue the request that last failed. Returns false unless `Failed`.
    pub fn retry(&mut self) -> bool {
        self.dispatch(PageEvent::RetryRequested)
    }

    /// Apply completed fetches. Returns true if the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(PageResult { request, result }) = self.rx.try_recv() {
            let effects = self.machine.update(PageEvent::FetchCompleted { request, result });
            changed |= !effects.is_empty();
            self.run(effects);
        }
        changed
    }

    fn dispatch(&mut self, event: PageEvent) -> bool {
        let effects = self.machine.update(event);
        let fetched = effects.iter().any(|e| matches!(e, PageEffect::Fetch(_)));
        self.run(effects);
        fetched
    }

    fn run(&mut self, effects: Vec<PageEffect>) {
        for effect in effects {
            match effect {
                PageEffect::Publish(state) => self.emitter.emit(PaginationChangedEvent(state)),
                PageEffect::Fetch(request) => self.spawn_fetch(request),
            }
        }
    }

    fn spawn_fetch(&self, request: FetchRequest) {
        debug!(
            "pagination: fetching page {} (limit {}, generation {})",
            request.page, request.limit, request.generation
        );
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let job = self.generation.guard(request.generation, move || {
            let result = source.fetch(request.page, request.limit);
            // Receiver gone means the engine was dropped
            let _ = tx.send(PageResult { request, result });
        });
        self.pool.execute(job);
    }
}
