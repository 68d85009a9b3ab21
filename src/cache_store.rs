//! JSON file implementation of the warm-start [`CacheStore`].

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::entities::{CacheStore, FeedItem};

/// Stores the first page of the feed as a JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for JsonFileCache {
    fn save(&self, items: &[FeedItem]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string(items).context("Failed to serialize feed cache")?;
        // Write-then-rename so a crash never leaves a truncated cache
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write feed cache: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace feed cache: {}", self.path.display()))?;
        debug!("Saved {} items to {}", items.len(), self.path.display());
        Ok(())
    }

    /// Missing file is an empty cache, not an error.
    fn load(&self) -> Result<Vec<FeedItem>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read feed cache: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt feed cache: {}", self.path.display()))
    }
}
