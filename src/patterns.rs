//! Compiled regex patterns for the Unreal Engine log dialect.
//!
//! Parse patterns recognize the line shapes the engine emits; highlight
//! patterns feed the automatic annotation pass of the highlight
//! resolver. All are compiled once on first use.

use once_cell::sync::Lazy;
use regex::Regex;

/// Standard line: `[2026.02.14-03.33.56:070][  0]LogCategory: Verbosity: Message`
pub static PATTERN_STANDARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[(\d{4}\.\d{2}\.\d{2}-\d{2}\.\d{2}\.\d{2}:\d{3})\]\[\s*(\d+)\](\w+):\s*(\w+):\s*(.*)$",
    )
    .expect("invalid standard pattern")
});

/// Simple line: `LogCategory: Display: Message`
pub static PATTERN_SIMPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+):\s*(\w+):\s*(.*)$").expect("invalid simple pattern"));

/// File header: `Log file open, 02/14/26 11:33:35`
pub static PATTERN_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Log file open,\s*(\d{2}/\d{2}/\d{2}\s+\d{2}:\d{2}:\d{2})")
        .expect("invalid header pattern")
});

/// Windows path: `C:\xxx` or `\\xxx`
pub static HIGHLIGHT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]:\\[^\s:]*|\\\\[^\s:]+").expect("invalid path pattern"));

/// UUID: `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
pub static HIGHLIGHT_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("invalid UUID pattern")
});

/// Bare number, integer or decimal.
pub static HIGHLIGHT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\.?\d*\b").expect("invalid number pattern"));

/// Category prefix of a standard or simple line.
pub static EXTRACT_CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[.*?\]\[\s*\d+\](\w+):|^(\w+):").expect("invalid category extract pattern")
});

/// Verbosity token anywhere in a line, tolerating the space the engine
/// emits after the category colon.
pub static EXTRACT_LEVEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":\s*(Error|Warning|Display|Verbose|VeryVerbose):")
        .expect("invalid level extract pattern")
});
