// Log viewer core - windowed chunk cache and highlight resolution
//
// The cache tracks which line ranges of a very large log are resident,
// fetches only the gaps a viewport needs, and resolves overlapping
// highlight annotations into a per-line rendering plan. File indexing,
// range reading, and search live behind seams so embedders can swap
// the transport.

pub mod cache;
pub mod config;
pub mod error;
pub mod highlight;
pub mod index;
pub mod loader;
pub mod parser;
pub mod patterns;
pub mod ranges;
pub mod search;
pub mod session;
pub mod types;
pub mod viewport;

pub use cache::{ChunkCache, LoadOutcome};
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use highlight::{resolve_line, HighlightRule, HighlightSpan, LineSegment, RuleStore, SpanSource};
pub use index::{index_file, FileIndexer};
pub use loader::{LineLoader, LineReader};
pub use parser::LogParser;
pub use ranges::{LineRange, RangeSet};
pub use search::{SearchEngine, SearchNavigator};
pub use session::{LogSession, SearchOutcome};
pub use types::{
    FileIndex, LogChunk, LogEntry, LogLevel, OpenFileResult, SearchOptions, SearchResult,
};
pub use viewport::ViewportTracker;
