//! Domain types shared by the core and its collaborators.

pub mod errors;
pub mod feed_item;
pub mod handle;
pub mod policy;
pub mod traits;

pub use errors::{FetchError, InitError, PolicyViolation};
pub use feed_item::{parse_page, FeedItem, FeedSnapshot};
pub use handle::{HandleInfo, Lifecycle, ResourceHandle};
pub use policy::WindowPolicy;
pub use traits::{CacheStore, DataSource, MediaId, PlaybackEngine, WorkerPool};
