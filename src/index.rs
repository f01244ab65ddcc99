//! File indexing.
//!
//! One memory-mapped pass over the file produces the [`FileIndex`]: the
//! total line count, a byte offset every [`FileIndex::INDEX_INTERVAL`]
//! lines so readers can seek near any line, and category/level
//! histograms for the sidebar. The histogram pass uses the extraction
//! regexes only, not the full parser, so indexing stays single-pass
//! cheap on multi-gigabyte files.

use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::parser::LogParser;
use crate::types::FileIndex;

pub struct FileIndexer {
    file_path: String,
    mmap: Mmap,
}

impl FileIndexer {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_string_lossy().to_string();
        let file = File::open(&path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { file_path, mmap })
    }

    /// Walk the mapped bytes once, recording offsets and statistics.
    pub fn build_index(&self) -> FileIndex {
        let mut index = FileIndex::new(self.file_path.clone(), self.mmap.len() as u64);

        let mut line_offsets: Vec<u64> = vec![0];
        let mut current_offset: u64 = 0;
        let mut line_count: u64 = 0;
        let mut categories: HashMap<String, u64> = HashMap::new();
        let mut level_counts: HashMap<String, u64> = HashMap::new();

        let data = &self.mmap;
        for (i, &byte) in data.iter().enumerate() {
            if byte == b'\n' {
                line_count += 1;

                let start = current_offset as usize;
                if start < i {
                    if let Ok(line) = std::str::from_utf8(&data[start..i]) {
                        if let Some(category) = LogParser::extract_category(line) {
                            *categories.entry(category).or_insert(0) += 1;
                        }
                        if let Some(level) = LogParser::extract_level(line) {
                            *level_counts
                                .entry(level.display_name().to_string())
                                .or_insert(0) += 1;
                        }
                    }
                }

                if line_count % FileIndex::INDEX_INTERVAL == 0 {
                    line_offsets.push((i + 1) as u64);
                }
                current_offset = (i + 1) as u64;
            }
        }

        // A final line without a trailing newline still counts.
        if current_offset < data.len() as u64 {
            line_count += 1;
        }

        index.total_lines = line_count;
        index.line_offsets = line_offsets;
        index.categories = categories;
        index.level_counts = level_counts;

        debug!(
            path = %index.file_path,
            total_lines = index.total_lines,
            blocks = index.line_offsets.len(),
            "indexed file"
        );
        index
    }

    pub fn file_size(&self) -> u64 {
        self.mmap.len() as u64
    }
}

/// Index a file in one call.
pub fn index_file<P: AsRef<Path>>(path: P) -> Result<FileIndex> {
    let indexer = FileIndexer::open(path)?;
    Ok(indexer.build_index())
}
