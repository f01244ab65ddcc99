//! The windowed chunk cache.
//!
//! Owns the [`RangeSet`] of loaded intervals plus the line-number →
//! entry mapping, and fills viewport-driven gaps through a
//! [`LineLoader`]. Invariant: a line number has an entry in the map if
//! and only if it is covered by the range set. Both structures are
//! mutated together in [`ChunkCache::absorb`] only, which is what keeps
//! the invariant easy to audit.

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::error::Result;
use crate::loader::LineLoader;
use crate::ranges::{LineRange, RangeSet};
use crate::types::{LogChunk, LogEntry};

/// What one `ensure_loaded` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The clamped interval was already fully covered; no fetch ran.
    AlreadyLoaded,
    /// Another load is in flight; nothing was fetched. Re-issue after
    /// it completes (the next viewport event does this naturally).
    Busy,
    /// The listed gaps were fetched and merged, in ascending order.
    Loaded { fetched: Vec<LineRange> },
}

#[derive(Debug, Default)]
pub struct ChunkCache {
    loaded: RangeSet,
    entries: HashMap<u64, LogEntry>,
    total_lines: u64,
    /// Single-flight guard. An explicit flag rather than an artifact of
    /// execution order, so the policy survives a port to a parallel
    /// runtime.
    in_flight: bool,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset and seed from the entries delivered by `open`. The preview
    /// establishes the starting invariant without a loader round-trip.
    pub fn seed(&mut self, total_lines: u64, preview: Vec<LogEntry>) {
        self.clear();
        self.total_lines = total_lines;
        if preview.is_empty() {
            return;
        }
        let range = LineRange::new(
            preview.first().map(|e| e.line_number).unwrap_or(1),
            preview.last().map(|e| e.line_number).unwrap_or(1),
        );
        for entry in preview {
            self.entries.insert(entry.line_number, entry);
        }
        self.loaded.insert(range);
        debug!(start = range.start, end = range.end, "seeded cache from preview");
    }

    /// Clear everything, including the in-flight marker.
    pub fn clear(&mut self) {
        self.loaded.clear();
        self.entries.clear();
        self.total_lines = 0;
        self.in_flight = false;
    }

    pub fn total_lines(&self) -> u64 {
        self.total_lines
    }

    pub fn loaded_ranges(&self) -> &[LineRange] {
        self.loaded.ranges()
    }

    pub fn is_loaded(&self, line: u64) -> bool {
        self.loaded.covers_line(line)
    }

    pub fn entry(&self, line: u64) -> Option<&LogEntry> {
        self.entries.get(&line)
    }

    /// Make `start..=end` resident. Clamps to the file, returns
    /// immediately when covered, otherwise fetches each gap in
    /// ascending order, merging each result before the next fetch
    /// begins. A failed fetch aborts the remaining gaps but keeps the
    /// progress made so far.
    pub fn ensure_loaded<L: LineLoader>(
        &mut self,
        start: u64,
        end: u64,
        loader: &mut L,
    ) -> Result<LoadOutcome> {
        let query = match LineRange::new(start.min(end), start.max(end)).clamped(self.total_lines) {
            Some(q) => q,
            None => return Ok(LoadOutcome::AlreadyLoaded),
        };
        if self.loaded.covers(query) {
            trace!(start = query.start, end = query.end, "range already resident");
            return Ok(LoadOutcome::AlreadyLoaded);
        }
        if self.in_flight {
            debug!(start = query.start, end = query.end, "load already in flight, skipping");
            return Ok(LoadOutcome::Busy);
        }

        self.in_flight = true;
        let gaps = self.loaded.gaps(query);
        let mut fetched = Vec::with_capacity(gaps.len());
        for gap in gaps {
            match loader.load_range(gap.start, gap.end) {
                Ok(chunk) => {
                    self.absorb(chunk);
                    fetched.push(gap);
                }
                Err(err) => {
                    // Keep partial progress; the caller retries by
                    // re-issuing the same viewport event.
                    self.in_flight = false;
                    return Err(err);
                }
            }
        }
        self.in_flight = false;
        Ok(LoadOutcome::Loaded { fetched })
    }

    /// Merge one fetched chunk into the entry map and the range set.
    pub fn absorb(&mut self, chunk: LogChunk) {
        if chunk.entries.is_empty() {
            return;
        }
        for entry in chunk.entries {
            self.entries.insert(entry.line_number, entry);
        }
        self.loaded
            .insert(LineRange::new(chunk.start_line, chunk.end_line));
        trace!(start = chunk.start_line, end = chunk.end_line, "absorbed chunk");
    }

    /// Whether a load is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    #[cfg(test)]
    pub(crate) fn set_busy_for_test(&mut self, busy: bool) {
        self.in_flight = busy;
    }
}
