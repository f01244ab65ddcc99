//! Core data types shared across the viewer.
//!
//! These cross a serialization boundary in embedding applications (the
//! entries and search results are shipped to a rendering frontend), so
//! everything here derives serde in addition to the usual traits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Verbosity level of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    Display,
    Verbose,
    VeryVerbose,
    Unknown,
}

impl LogLevel {
    /// Parse a level name case-insensitively. Unrecognized names map to
    /// `Unknown` rather than failing; log files contain garbage.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warning" => LogLevel::Warning,
            "display" => LogLevel::Display,
            "verbose" => LogLevel::Verbose,
            "veryverbose" => LogLevel::VeryVerbose,
            _ => LogLevel::Unknown,
        }
    }

    /// Canonical display name, also used as the histogram key in
    /// [`FileIndex::level_counts`].
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warning => "Warning",
            LogLevel::Display => "Display",
            LogLevel::Verbose => "Verbose",
            LogLevel::VeryVerbose => "VeryVerbose",
            LogLevel::Unknown => "Unknown",
        }
    }
}

/// One parsed log line.
///
/// `line_number` is the identity: 1-based and unique within a file
/// session. Everything else is payload the cache treats as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub line_number: u64,
    /// Original line content, trailing whitespace trimmed.
    pub raw: String,
    pub timestamp: Option<String>,
    /// Frame counter from the bracketed prefix, when present.
    pub frame: Option<u64>,
    pub category: Option<String>,
    pub level: LogLevel,
    pub message: Option<String>,
    /// True for wrapped continuations of a preceding line.
    pub is_continuation: bool,
}

impl LogEntry {
    /// An entry for a line that matched no known format.
    pub fn unparsed(line_number: u64, content: String) -> Self {
        Self {
            line_number,
            raw: content,
            timestamp: None,
            frame: None,
            category: None,
            level: LogLevel::Unknown,
            message: None,
            is_continuation: false,
        }
    }
}

/// Read-only summary of an indexed file.
///
/// Bounds all interval arithmetic: every line range handled by the cache
/// is clamped to `1..=total_lines` before any other math runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIndex {
    pub file_path: String,
    pub total_lines: u64,
    pub file_size: u64,
    /// Byte offset of line `n * index_interval + 1`, one entry per
    /// started block. The first entry is always 0.
    pub line_offsets: Vec<u64>,
    pub index_interval: u64,
    /// Occurrences per log category.
    pub categories: HashMap<String, u64>,
    /// Occurrences per level display name.
    pub level_counts: HashMap<String, u64>,
}

impl FileIndex {
    /// Lines per offset-table block.
    pub const INDEX_INTERVAL: u64 = 1000;

    pub fn new(file_path: String, file_size: u64) -> Self {
        Self {
            file_path,
            total_lines: 0,
            file_size,
            line_offsets: Vec::new(),
            index_interval: Self::INDEX_INTERVAL,
            categories: HashMap::new(),
            level_counts: HashMap::new(),
        }
    }
}

/// A batch of entries for one loaded line interval; the loader's unit of
/// transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogChunk {
    pub start_line: u64,
    pub end_line: u64,
    pub entries: Vec<LogEntry>,
}

impl LogChunk {
    /// A chunk carrying no lines (e.g. a request clamped to nothing).
    pub fn empty(start_line: u64) -> Self {
        Self {
            start_line,
            end_line: start_line,
            entries: Vec::new(),
        }
    }
}

/// One search match.
///
/// `start`/`end` are byte offsets into the line's raw text as produced
/// by the regex engine (`start < end`, always on char boundaries).
/// Result lists are ordered ascending by `(line_number, start)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub line_number: u64,
    pub matched_text: String,
    pub start: usize,
    pub end: usize,
}

/// Options for one search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    pub pattern: String,
    /// When false the pattern is matched literally (metacharacters
    /// escaped).
    pub use_regex: bool,
    pub case_insensitive: bool,
    pub start_line: Option<u64>,
    pub end_line: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            use_regex: true,
            case_insensitive: true,
            start_line: None,
            end_line: None,
        }
    }
}

/// What `open` hands back: the index plus the eagerly-parsed preview
/// that seeds the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenFileResult {
    pub index: FileIndex,
    pub preview: Vec<LogEntry>,
}
