//! Feed item value type and page payload decoding.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::FetchError;

/// One entry of the feed. Identity is `id`; position is its index in the
/// accumulated list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(alias = "mediaUrl", alias = "video_url", alias = "videoUrl")]
    pub media_url: String,
    #[serde(alias = "thumbnailUrl", alias = "thumbnail", default)]
    pub thumbnail_url: String,
}

/// Read-only, cheaply clonable view of the accumulated feed.
pub type FeedSnapshot = Arc<[FeedItem]>;

impl FeedItem {
    pub fn new(id: impl Into<String>, media_url: impl Into<String>, thumbnail_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_url: media_url.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }
}

/// Accepted page shapes: a bare array, or an object wrapping the array
/// under `items` or `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PagePayload {
    Bare(Vec<FeedItem>),
    Items { items: Vec<FeedItem> },
    Data { data: Vec<FeedItem> },
}

/// Decode one page of items from a JSON payload.
///
/// Anything that is not one of the accepted shapes is a [`FetchError`],
/// never a panic.
pub fn parse_page(payload: &str) -> Result<Vec<FeedItem>, FetchError> {
    let page: PagePayload = serde_json::from_str(payload)
        .map_err(|e| FetchError::new(format!("unexpected page payload: {}", e)))?;

    Ok(match page {
        PagePayload::Bare(items) => items,
        PagePayload::Items { items } => items,
        PagePayload::Data { data } => data,
    })
}
