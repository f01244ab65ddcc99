//! Log-line classification.
//!
//! Turns one raw line into a [`LogEntry`]. Parsing never fails: a line
//! that matches no known shape becomes an unparsed entry carrying its
//! raw text.

use crate::patterns::*;
use crate::types::{LogEntry, LogLevel};

pub struct LogParser;

impl LogParser {
    /// Parse a single line. `line_number` is 1-based.
    pub fn parse_line(line_number: u64, content: &str) -> LogEntry {
        let trimmed = content.trim_end();

        // Continuations carry no header of their own; classify them
        // before the format patterns get a chance to misfire on them.
        if Self::is_continuation(trimmed) {
            return LogEntry {
                line_number,
                raw: trimmed.to_string(),
                timestamp: None,
                frame: None,
                category: None,
                level: LogLevel::Unknown,
                message: Some(trimmed.to_string()),
                is_continuation: true,
            };
        }

        if let Some(caps) = PATTERN_STANDARD.captures(trimmed) {
            return LogEntry {
                line_number,
                raw: trimmed.to_string(),
                timestamp: Some(caps[1].to_string()),
                frame: caps[2].parse().ok(),
                category: Some(caps[3].to_string()),
                level: LogLevel::parse(&caps[4]),
                message: Some(caps[5].to_string()),
                is_continuation: false,
            };
        }

        if let Some(caps) = PATTERN_SIMPLE.captures(trimmed) {
            return LogEntry {
                line_number,
                raw: trimmed.to_string(),
                timestamp: None,
                frame: None,
                category: Some(caps[1].to_string()),
                level: LogLevel::parse(&caps[2]),
                message: Some(caps[3].to_string()),
                is_continuation: false,
            };
        }

        if PATTERN_HEADER.is_match(trimmed) {
            return LogEntry {
                line_number,
                raw: trimmed.to_string(),
                timestamp: Some(trimmed.replace("Log file open, ", "")),
                frame: None,
                category: Some("LogFile".to_string()),
                level: LogLevel::Display,
                message: Some("Log file opened".to_string()),
                is_continuation: false,
            };
        }

        LogEntry::unparsed(line_number, trimmed.to_string())
    }

    fn is_continuation(line: &str) -> bool {
        line.starts_with(' ') || line.starts_with('>') || line.is_empty()
    }

    /// Extract just the verbosity level, for single-pass indexing.
    pub fn extract_level(line: &str) -> Option<LogLevel> {
        EXTRACT_LEVEL
            .captures(line)
            .map(|caps| LogLevel::parse(&caps[1]))
    }

    /// Extract just the category prefix, for single-pass indexing.
    pub fn extract_category(line: &str) -> Option<String> {
        let caps = EXTRACT_CATEGORY.captures(line)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_format() {
        let line = "[2026.02.14-03.33.56:070][  0]LogWindows: Error: Test error message";
        let entry = LogParser::parse_line(1, line);

        assert_eq!(entry.line_number, 1);
        assert_eq!(entry.timestamp, Some("2026.02.14-03.33.56:070".to_string()));
        assert_eq!(entry.frame, Some(0));
        assert_eq!(entry.category, Some("LogWindows".to_string()));
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.message, Some("Test error message".to_string()));
        assert!(!entry.is_continuation);
    }

    #[test]
    fn test_parse_simple_format() {
        let entry = LogParser::parse_line(1, "LogInit: Warning: Initialization issue");
        assert_eq!(entry.category, Some("LogInit".to_string()));
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.message, Some("Initialization issue".to_string()));
    }

    #[test]
    fn test_parse_continuation() {
        let entry = LogParser::parse_line(1, "  continued message here");
        assert!(entry.is_continuation);
        assert_eq!(entry.level, LogLevel::Unknown);
    }

    #[test]
    fn test_parse_header() {
        let entry = LogParser::parse_line(1, "Log file open, 02/14/26 11:33:35");
        assert_eq!(entry.category, Some("LogFile".to_string()));
        assert_eq!(entry.level, LogLevel::Display);
        assert_eq!(entry.timestamp, Some("02/14/26 11:33:35".to_string()));
    }

    #[test]
    fn test_parse_unrecognized_line_keeps_raw() {
        let entry = LogParser::parse_line(7, "completely free-form text");
        assert_eq!(entry.raw, "completely free-form text");
        assert_eq!(entry.category, None);
        assert_eq!(entry.level, LogLevel::Unknown);
    }

    #[test]
    fn test_extract_category_handles_both_shapes() {
        assert_eq!(
            LogParser::extract_category("[2026.02.14-03.33.56:070][  0]LogNet: Display: hi"),
            Some("LogNet".to_string())
        );
        assert_eq!(
            LogParser::extract_category("LogTemp: Warning: hmm"),
            Some("LogTemp".to_string())
        );
        assert_eq!(LogParser::extract_category("no category here"), None);
    }
}
