//! REELFEED - Infinite vertical short-video feed core
//!
//! Re-exports all modules for use by binary targets.

// Feed core (pagination, window, gate, events, workers)
pub mod core;

// App modules
pub mod cache_store;
pub mod cli;
pub mod config;
pub mod entities;
pub mod sim;

// Re-export commonly used types from core
pub use crate::core::event_bus::{downcast_event, BoxedEvent, EventBus, EventEmitter};
pub use crate::core::{FeedController, PaginationState, ResourceWindow, Workers};

// Re-export entities
pub use entities::{FeedItem, FeedSnapshot, WindowPolicy};
