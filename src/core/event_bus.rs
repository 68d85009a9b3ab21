//! Pub/Sub event bus for delivering feed state to the presentation layer.
//!
//! - `subscribe()` registers a callback per event type (invoked synchronously
//!   on the emitting thread, FIFO in subscription order)
//! - `emit()` invokes callbacks AND queues the event
//! - `poll()` drains the queue for batch processing in the UI loop
//!
//! Cross-type order of callbacks is not defined; the queue preserves emit order.

use log::warn;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Maximum queued events before the oldest half is dropped
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events. Events must be Send + Sync + 'static.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Boxed event for queue storage
pub type BoxedEvent = Box<dyn Event>;

#[derive(Default)]
struct Shared {
    subscribers: RwLock<HashMap<TypeId, Vec<Callback>>>,
    queue: Mutex<Vec<BoxedEvent>>,
}

impl Shared {
    fn dispatch<E: Event + Clone>(&self, event: E) {
        // Clone the callback list so subscribers may subscribe/emit re-entrantly
        let callbacks: Vec<Callback> = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();
        for cb in &callbacks {
            cb(&event);
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = queue.len() / 2;
            warn!("EventBus queue full ({} events), dropping oldest {}", queue.len(), evict_count);
            queue.drain(0..evict_count);
        }
        queue.push(Box::new(event));
    }
}

/// Pub/Sub event bus with deferred processing support.
#[derive(Clone, Default)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queue_len", &self.queue_len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events of type E.
    ///
    /// # Example
    /// ```ignore
    /// bus.subscribe::<HandleStatusEvent, _>(|e| {
    ///     if let HandleStatus::Failed { .. } = e.status { show_thumbnail(e.index) }
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.shared
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    /// Invoke callbacks immediately and queue for `poll()`.
    pub fn emit<E: Event + Clone>(&self, event: E) {
        self.shared.dispatch(event);
    }

    /// Drain all events emitted since the last poll, in emit order.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.shared.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Emit-only handle for components.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            shared: Some(Arc::clone(&self.shared)),
        }
    }

    pub fn unsubscribe_all<E: Event>(&self) {
        self.shared
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&TypeId::of::<E>());
    }

    pub fn has_subscribers<E: Event>(&self) -> bool {
        self.shared
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&TypeId::of::<E>())
            .is_some_and(|v| !v.is_empty())
    }

    pub fn queue_len(&self) -> usize {
        self.shared.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Emit-only handle. A detached emitter (`EventEmitter::detached()`) drops
/// every event.
#[derive(Clone, Default)]
pub struct EventEmitter {
    shared: Option<Arc<Shared>>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("attached", &self.shared.is_some())
            .finish()
    }
}

impl EventEmitter {
    pub fn detached() -> Self {
        Self { shared: None }
    }

    pub fn emit<E: Event + Clone>(&self, event: E) {
        if let Some(shared) = &self.shared {
            shared.dispatch(event);
        }
    }
}

/// Downcast a polled event to a concrete type.
///
/// Must deref to `dyn Event` before `as_any()`: the blanket impl also covers
/// `Box<dyn Event>` itself, which would downcast to the box instead.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}
