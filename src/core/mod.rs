//! Feed core - pagination, resource window, playback gate, events, workers
//!
//! These modules are independent of any UI toolkit. Everything here is
//! driven from one owning thread; background work comes back via `poll()`.

pub mod controller;
pub mod epoch;
pub mod event_bus;
pub mod feed_events;
pub mod pagination;
pub mod playback_gate;
pub mod resource_window;
pub mod workers;

#[cfg(test)]
pub mod test_support;

// Re-exports for convenience
pub use controller::FeedController;
pub use epoch::Epoch;
pub use event_bus::{EventBus, EventEmitter};
pub use feed_events::{
    CurrentIndexChangedEvent, HandleStatus, HandleStatusEvent, PaginationChangedEvent,
    WarmStartEvent,
};
pub use pagination::{PaginationEngine, PaginationState};
pub use playback_gate::{GateDecision, PlaybackGate};
pub use resource_window::{ResourceWindow, WindowStats};
pub use workers::{InlinePool, Workers};
