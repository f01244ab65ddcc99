//! The session context object.
//!
//! One [`LogSession`] owns everything that belongs to the currently
//! open file - cache, viewport tracker, search navigator - plus the
//! session-lifetime highlight rules. There is no ambient global state;
//! closing the file is an explicit reset, and a generation counter
//! gives each open file an identity so results from a superseded load
//! can be recognized and dropped.

use std::path::Path;
use tracing::{debug, warn};

use crate::cache::{ChunkCache, LoadOutcome};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::highlight::{resolve_line, LineSegment, RuleStore};
use crate::index::index_file;
use crate::loader::{LineLoader, LineReader};
use crate::search::{SearchEngine, SearchNavigator};
use crate::types::{FileIndex, LogChunk, LogEntry, OpenFileResult, SearchOptions, SearchResult};
use crate::viewport::ViewportTracker;

/// What one search request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The search ran; the navigator now holds this many results.
    Completed(usize),
    /// A search was already in flight; nothing ran.
    Busy,
}

/// Per-file state, dropped wholesale on close.
struct OpenFile<L> {
    index: FileIndex,
    loader: L,
    cache: ChunkCache,
    viewport: ViewportTracker,
    navigator: SearchNavigator,
    search_in_flight: bool,
}

/// A viewer session over at most one open file.
pub struct LogSession<L = LineReader> {
    config: ViewerConfig,
    rules: RuleStore,
    file: Option<OpenFile<L>>,
    /// Bumped on every open and close; load results tagged with an
    /// older generation are stale and must not be merged.
    generation: u64,
}

impl<L> LogSession<L> {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            rules: RuleStore::new(),
            file: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The identity of the currently open file. Capture this before
    /// starting a load and pass it back to [`LogSession::apply_chunk`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn index(&self) -> Option<&FileIndex> {
        self.file.as_ref().map(|f| &f.index)
    }

    /// Highlight rules survive open/close; they belong to the session.
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleStore {
        &mut self.rules
    }

    /// Install an already-opened file: index, preview entries, and the
    /// loader that will serve subsequent range fetches. The preview
    /// seeds the cache so the first paint needs no round-trip.
    pub fn open_with(&mut self, index: FileIndex, preview: Vec<LogEntry>, loader: L) {
        self.generation += 1;
        let mut cache = ChunkCache::new();
        cache.seed(index.total_lines, preview);
        debug!(path = %index.file_path, total_lines = index.total_lines, "session opened file");
        self.file = Some(OpenFile {
            viewport: ViewportTracker::new(self.config.preload_threshold, self.config.chunk_size),
            navigator: SearchNavigator::new(),
            search_in_flight: false,
            cache,
            index,
            loader,
        });
    }

    /// Drop all per-file state. Highlight rules are kept; any load
    /// still in flight is invalidated via the generation bump.
    pub fn close_file(&mut self) {
        if self.file.take().is_some() {
            self.generation += 1;
            debug!("session closed file");
        }
    }

    fn open_file_state(&mut self) -> Result<&mut OpenFile<L>> {
        self.file.as_mut().ok_or(ViewerError::NoFile)
    }

    /// The cached entry for a line, if that line is resident.
    pub fn entry(&self, line: u64) -> Option<&LogEntry> {
        self.file.as_ref().and_then(|f| f.cache.entry(line))
    }

    pub fn is_loaded(&self, line: u64) -> bool {
        self.file.as_ref().is_some_and(|f| f.cache.is_loaded(line))
    }

    /// Results of the last search, in `(line, offset)` order.
    pub fn search_results(&self) -> &[SearchResult] {
        self.file.as_ref().map_or(&[], |f| f.navigator.results())
    }

    pub fn current_match(&self) -> Option<&SearchResult> {
        self.file.as_ref().and_then(|f| f.navigator.current())
    }

    pub fn current_match_index(&self) -> isize {
        self.file.as_ref().map_or(-1, |f| f.navigator.current_index())
    }

    /// Advance to the next match, wrapping at the end. Callers ensure
    /// the target line is loaded (via [`LogSession::scroll_to_line`])
    /// before rendering it.
    pub fn next_match(&mut self) -> Option<&SearchResult> {
        self.file.as_mut().and_then(|f| f.navigator.next())
    }

    /// Step to the previous match, wrapping at the start.
    pub fn prev_match(&mut self) -> Option<&SearchResult> {
        self.file.as_mut().and_then(|f| f.navigator.prev())
    }

    /// Resolve the highlight segmentation for a resident line.
    /// `None` when the line is not loaded (or no file is open).
    pub fn highlights_for_line(&self, line: u64) -> Option<Vec<LineSegment>> {
        let file = self.file.as_ref()?;
        let entry = file.cache.entry(line)?;
        let matches = file.navigator.results_for_line(line);
        Some(resolve_line(&entry.raw, matches, &self.rules))
    }

    /// Merge a chunk fetched outside `ensure_loaded` (an async
    /// transport completing late). Returns false - and merges nothing -
    /// when `generation` no longer matches the open file; stale results
    /// are dropped silently by design.
    pub fn apply_chunk(&mut self, generation: u64, chunk: LogChunk) -> bool {
        if generation != self.generation {
            warn!(
                got = generation,
                current = self.generation,
                "dropping stale load result"
            );
            return false;
        }
        match self.file.as_mut() {
            Some(file) => {
                file.cache.absorb(chunk);
                true
            }
            None => false,
        }
    }
}

impl<L: LineLoader> LogSession<L> {
    /// Make `start..=end` resident, fetching whatever gaps remain.
    pub fn ensure_loaded(&mut self, start: u64, end: u64) -> Result<LoadOutcome> {
        let file = self.open_file_state()?;
        file.cache.ensure_loaded(start, end, &mut file.loader)
    }

    /// Renderer notification: rows `first_index..=last_index` (zero
    /// based) became visible. Expands by the preload margin and loads
    /// the result.
    pub fn visible_range_changed(
        &mut self,
        first_index: usize,
        last_index: usize,
    ) -> Result<LoadOutcome> {
        let file = self.open_file_state()?;
        let total = file.index.total_lines;
        match file.viewport.visible_range_changed(first_index, last_index, total) {
            Some(range) => file.cache.ensure_loaded(range.start, range.end, &mut file.loader),
            None => Ok(LoadOutcome::AlreadyLoaded),
        }
    }

    /// Load a window around `line` before the caller scrolls there, so
    /// the target has data by the time the UI focuses it.
    pub fn scroll_to_line(&mut self, line: u64) -> Result<LoadOutcome> {
        let file = self.open_file_state()?;
        let total = file.index.total_lines;
        match file.viewport.scroll_target_window(line, total) {
            Some(range) => file.cache.ensure_loaded(range.start, range.end, &mut file.loader),
            None => Ok(LoadOutcome::AlreadyLoaded),
        }
    }

    /// Run a search over the open file and install the results in the
    /// navigator, replacing any previous list wholesale. An invalid
    /// pattern surfaces as [`ViewerError::Pattern`] and leaves the
    /// previous results in place.
    pub fn run_search(&mut self, options: &SearchOptions) -> Result<SearchOutcome> {
        let file = self.open_file_state()?;
        if file.search_in_flight {
            debug!("search already in flight, skipping");
            return Ok(SearchOutcome::Busy);
        }
        let engine = SearchEngine::new(options)?;

        file.search_in_flight = true;
        let outcome = engine.search_in_file(&file.index.file_path, &file.index, options);
        file.search_in_flight = false;

        let results = outcome?;
        let count = results.len();
        debug!(count, pattern = %options.pattern, "search completed");
        file.navigator.set_results(results);
        Ok(SearchOutcome::Completed(count))
    }
}

impl LogSession<LineReader> {
    /// Index `path`, read the preview, and open the file in this
    /// session. Any previously open file is closed first.
    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> Result<OpenFileResult> {
        let index = index_file(&path)?;
        let mut reader =
            LineReader::from_index(&path, index.clone(), self.config.block_cache_capacity)?;
        let preview = reader.read_preview(self.config.preview_length)?;

        let result = OpenFileResult {
            index: index.clone(),
            preview: preview.clone(),
        };
        self.open_with(index, preview, reader);
        Ok(result)
    }
}

impl Default for LogSession<LineReader> {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
