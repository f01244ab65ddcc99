//! The loader seam and its file-backed implementation.
//!
//! The cache only ever talks to [`LineLoader`], so transports other than
//! a local file (remote agents, test doubles) can be substituted without
//! touching the interval logic. [`LineReader`] is the production
//! implementation: it seeks to the nearest indexed offset, parses
//! forward, and keeps whole index-interval blocks in an LRU cache so
//! repeated viewport reads near each other never re-touch the disk.

use lru::LruCache;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ViewerError};
use crate::parser::LogParser;
use crate::types::{FileIndex, LogChunk, LogEntry};

/// External collaborator that fetches a contiguous range of parsed
/// lines. Implementations must return exactly the entries whose line
/// numbers fall inside the (clamped) requested range, in order.
pub trait LineLoader {
    fn load_range(&mut self, start_line: u64, end_line: u64) -> Result<LogChunk>;
}

/// Seek-based reader over an indexed log file.
pub struct LineReader {
    file: File,
    index: FileIndex,
    /// Parsed entries per offset-table block, keyed by block index.
    blocks: LruCache<u64, Vec<LogEntry>>,
    /// Number of times a block had to be read from disk.
    disk_reads: u64,
}

impl LineReader {
    /// Create a reader for `path` using a previously built index.
    pub fn from_index<P: AsRef<Path>>(
        path: P,
        index: FileIndex,
        cache_capacity: usize,
    ) -> Result<Self> {
        let file = File::open(path)?;
        let capacity = NonZeroUsize::new(cache_capacity.max(1)).expect("capacity is at least 1");
        Ok(Self {
            file,
            index,
            blocks: LruCache::new(capacity),
            disk_reads: 0,
        })
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    /// How many block reads have gone to disk so far. Reads served from
    /// the block cache do not advance this counter.
    pub fn disk_reads(&self) -> u64 {
        self.disk_reads
    }

    /// Read the entries for `start_line..=end_line`, clamped to the
    /// file. Returns an empty chunk when nothing remains after
    /// clamping.
    pub fn read_range(&mut self, start_line: u64, end_line: u64) -> Result<LogChunk> {
        let start = start_line.max(1);
        let end = end_line.min(self.index.total_lines);
        if self.index.total_lines == 0 || start > end {
            return Ok(LogChunk::empty(start));
        }

        let interval = self.index.index_interval;
        let first_block = (start - 1) / interval;
        let last_block = (end - 1) / interval;

        let mut entries = Vec::with_capacity((end - start + 1) as usize);
        for block_idx in first_block..=last_block {
            let block = self.block(block_idx).map_err(|source| ViewerError::Fetch {
                start,
                end,
                source,
            })?;
            entries.extend(
                block
                    .iter()
                    .filter(|e| e.line_number >= start && e.line_number <= end)
                    .cloned(),
            );
        }

        Ok(LogChunk {
            start_line: start,
            end_line: end,
            entries,
        })
    }

    /// Read a single line.
    pub fn read_line(&mut self, line_number: u64) -> Result<Option<LogEntry>> {
        let chunk = self.read_range(line_number, line_number)?;
        Ok(chunk.entries.into_iter().next())
    }

    /// Read the first `count` lines.
    pub fn read_preview(&mut self, count: u64) -> Result<Vec<LogEntry>> {
        let end = count.min(self.index.total_lines);
        if end == 0 {
            return Ok(Vec::new());
        }
        Ok(self.read_range(1, end)?.entries)
    }

    pub fn clear_cache(&mut self) {
        self.blocks.clear();
    }

    /// Fetch one whole block, from cache or disk.
    fn block(&mut self, block_idx: u64) -> std::io::Result<&Vec<LogEntry>> {
        if !self.blocks.contains(&block_idx) {
            let entries = self.read_block(block_idx)?;
            self.blocks.put(block_idx, entries);
            self.disk_reads += 1;
        }
        Ok(self
            .blocks
            .get(&block_idx)
            .expect("block was just inserted"))
    }

    /// Parse one index-interval worth of lines starting at the block's
    /// recorded offset.
    fn read_block(&mut self, block_idx: u64) -> std::io::Result<Vec<LogEntry>> {
        let interval = self.index.index_interval;
        let offset = self
            .index
            .line_offsets
            .get(block_idx as usize)
            .copied()
            .unwrap_or(0);
        let first_line = block_idx * interval + 1;

        self.file.seek(SeekFrom::Start(offset))?;
        let reader = BufReader::new(&self.file);

        let mut entries = Vec::new();
        for (i, line_result) in reader.lines().enumerate().take(interval as usize) {
            let line = line_result?;
            entries.push(LogParser::parse_line(first_line + i as u64, &line));
        }
        debug!(block = block_idx, lines = entries.len(), "read block from disk");
        Ok(entries)
    }
}

impl LineLoader for LineReader {
    fn load_range(&mut self, start_line: u64, end_line: u64) -> Result<LogChunk> {
        self.read_range(start_line, end_line)
    }
}
