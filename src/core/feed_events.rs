//! Events published by the feed controller on the [`EventBus`](super::EventBus).

use uuid::Uuid;

use crate::core::pagination::PaginationState;
use crate::entities::FeedSnapshot;

/// Emitted after every pagination state transition.
#[derive(Clone, Debug)]
pub struct PaginationChangedEvent(pub PaginationState);

/// Emitted when the centered feed item changes.
#[derive(Clone, Debug)]
pub struct CurrentIndexChangedEvent {
    pub old_index: Option<usize>,
    pub new_index: usize,
}

/// Per-handle status the presentation layer renders (player vs thumbnail).
#[derive(Clone, Debug, PartialEq)]
pub enum HandleStatus {
    Ready,
    /// Init failed: show the static thumbnail for this item only
    Failed { message: String },
    Released,
}

#[derive(Clone, Debug)]
pub struct HandleStatusEvent {
    pub index: usize,
    pub handle: Uuid,
    pub status: HandleStatus,
}

/// Cached items for display before the first page arrives. Not authoritative.
#[derive(Clone, Debug)]
pub struct WarmStartEvent {
    pub items: FeedSnapshot,
}
