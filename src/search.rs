//! Search: the regex engine and the result navigator.
//!
//! The engine owns text scanning; the navigator owns position within an
//! ordered result list. The navigator never fetches data itself —
//! callers ensure the target line is loaded before rendering it.

use regex::{Regex, RegexBuilder};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Result, ViewerError};
use crate::types::{FileIndex, SearchOptions, SearchResult};

/// Compiled search over log text.
#[derive(Debug)]
pub struct SearchEngine {
    regex: Regex,
}

impl SearchEngine {
    /// Compile the options into an engine. Literal patterns are escaped
    /// so metacharacters match verbatim.
    pub fn new(options: &SearchOptions) -> Result<Self> {
        let pattern = if options.use_regex {
            options.pattern.clone()
        } else {
            regex::escape(&options.pattern)
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(options.case_insensitive)
            .build()?;
        Ok(Self { regex })
    }

    /// All matches within one line of text.
    pub fn search_in_string(&self, text: &str, line_number: u64) -> Vec<SearchResult> {
        self.regex
            .find_iter(text)
            .map(|m| SearchResult {
                line_number,
                matched_text: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }

    /// Stream the file and collect matches within the options' line
    /// bounds. Results come back ordered by `(line_number, start)`.
    pub fn search_in_file<P: AsRef<Path>>(
        &self,
        path: P,
        index: &FileIndex,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let start_line = options.start_line.unwrap_or(1).max(1);
        let end_line = options.end_line.unwrap_or(index.total_lines);
        self.scan(path, index, start_line, end_line, usize::MAX)
    }

    /// Incremental search: scan at most `page_limit` lines starting at
    /// `from_line`, stopping early once `max_results` matches are
    /// collected. Callers resume from the line after the last result.
    pub fn search_next_page<P: AsRef<Path>>(
        &self,
        path: P,
        index: &FileIndex,
        from_line: u64,
        max_results: usize,
        page_limit: u64,
    ) -> Result<Vec<SearchResult>> {
        let from_line = from_line.max(1);
        let end_line = from_line
            .saturating_add(page_limit)
            .min(index.total_lines);
        self.scan(path, index, from_line, end_line, max_results)
    }

    fn scan<P: AsRef<Path>>(
        &self,
        path: P,
        index: &FileIndex,
        start_line: u64,
        end_line: u64,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let end_line = end_line.min(index.total_lines);
        let mut results = Vec::new();
        if index.total_lines == 0 || start_line > end_line {
            return Ok(results);
        }

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        // Seek to the indexed offset at or before the first wanted line.
        let offset_index = ((start_line - 1) / index.index_interval) as usize;
        if let Some(&offset) = index.line_offsets.get(offset_index) {
            reader.seek(SeekFrom::Start(offset))?;
        }

        let first_scanned = offset_index as u64 * index.index_interval;
        for (i, line_result) in reader.lines().enumerate() {
            let line_number = first_scanned + i as u64 + 1;
            if line_number > end_line || results.len() >= max_results {
                break;
            }
            if line_number < start_line {
                continue;
            }

            let line = line_result.map_err(|source| ViewerError::Fetch {
                start: start_line,
                end: end_line,
                source,
            })?;
            results.extend(self.search_in_string(&line, line_number));
        }
        results.truncate(max_results);
        Ok(results)
    }
}

/// Position within an ordered search-result list.
///
/// Results are replaced wholesale on each new search; navigation is
/// cyclic in both directions.
#[derive(Debug, Default)]
pub struct SearchNavigator {
    results: Vec<SearchResult>,
    selected: Option<usize>,
}

impl SearchNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the result list. Selection moves to the first result, or
    /// nowhere when the list is empty.
    pub fn set_results(&mut self, results: Vec<SearchResult>) {
        self.selected = if results.is_empty() { None } else { Some(0) };
        self.results = results;
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.selected = None;
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The selected result's index, `-1` when there is none.
    pub fn current_index(&self) -> isize {
        self.selected.map_or(-1, |i| i as isize)
    }

    pub fn current(&self) -> Option<&SearchResult> {
        self.selected.and_then(|i| self.results.get(i))
    }

    /// Advance cyclically; wraps from the last result to the first.
    /// No-op on an empty list.
    pub fn next(&mut self) -> Option<&SearchResult> {
        if let Some(i) = self.selected {
            self.selected = Some((i + 1) % self.results.len());
        }
        self.current()
    }

    /// Step back cyclically; wraps from the first result to the last.
    /// No-op on an empty list.
    pub fn prev(&mut self) -> Option<&SearchResult> {
        if let Some(i) = self.selected {
            self.selected = Some(if i == 0 { self.results.len() - 1 } else { i - 1 });
        }
        self.current()
    }

    /// The slice of results on one line, for highlight resolution.
    /// Relies on the list being ordered by `(line_number, start)`.
    pub fn results_for_line(&self, line_number: u64) -> &[SearchResult] {
        let lo = self.results.partition_point(|r| r.line_number < line_number);
        let hi = self.results.partition_point(|r| r.line_number <= line_number);
        &self.results[lo..hi]
    }
}
