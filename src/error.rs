//! Error taxonomy for the viewer core.
//!
//! Nothing here is fatal to the process: every variant is scoped to the
//! current file session and recoverable by retrying the triggering
//! operation or reopening the file.

use thiserror::Error;

/// Errors surfaced by the viewer core.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The loader failed while fetching a line range. Cache state is left
    /// at the last consistent partial result; re-issuing the same viewport
    /// event retries the remaining gaps.
    #[error("failed to fetch lines {start}..={end}: {source}")]
    Fetch {
        start: u64,
        end: u64,
        #[source]
        source: std::io::Error,
    },

    /// A search pattern or highlight rule failed to compile.
    #[error("invalid pattern: {source}")]
    Pattern {
        #[from]
        source: regex::Error,
    },

    /// A requested interval fell outside the indexed file. All public
    /// entry points clamp before interval math runs, so this marks a
    /// broken internal invariant rather than a user-facing condition.
    #[error("line range {start}..={end} outside 1..={total}")]
    Range { start: u64, end: u64, total: u64 },

    /// A load completed after the file identity changed. Dropped
    /// silently by the session; never shown to the user.
    #[error("stale load result for a superseded file")]
    Stale,

    /// An operation that requires an open file was invoked without one.
    #[error("no file is open")]
    NoFile,

    /// I/O failure while opening or indexing a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
