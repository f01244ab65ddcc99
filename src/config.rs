//! Viewer configuration.
//!
//! All knobs that tune the windowed cache and its collaborators live here
//! so an embedding application can persist them as one JSON object.
//! Unknown or missing fields fall back to the defaults, which lets old
//! config files keep working as knobs are added.

use serde::{Deserialize, Serialize};

/// Tunable parameters for a viewer session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Number of lines parsed eagerly when a file is opened. These seed
    /// the cache so the first paint needs no loader round-trip.
    pub preview_length: u64,

    /// Padding added above and below the visible range before loading.
    /// A user scrolling within this margin never sees a loading gap.
    pub preload_threshold: u64,

    /// Width of the window loaded around an explicit scroll target
    /// (search-result jumps, go-to-line).
    pub chunk_size: u64,

    /// Maximum lines scanned by one incremental search page.
    pub search_page_limit: u64,

    /// Number of index-interval blocks the line reader keeps in memory.
    pub block_cache_capacity: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            preview_length: 100,
            preload_threshold: 50,
            chunk_size: 200,
            search_page_limit: 10_000,
            block_cache_capacity: 100,
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from JSON, filling missing fields with
    /// defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
