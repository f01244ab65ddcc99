// End-to-end tests over a real indexed file and a scripted loader.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::Once;

use loglens::{
    LineLoader, LineRange, LoadOutcome, LogChunk, LogSession, SearchOptions, ViewerConfig,
};
use tempfile::NamedTempFile;

/// Initialize the global tracing subscriber once (used with `RUST_LOG`).
fn init_tracing_from_env() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stdout);
        let _ = subscriber.try_init();
    });
}

fn log_fixture(lines: u64) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for i in 1..=lines {
        if i % 100 == 0 {
            writeln!(
                file,
                "[2026.02.14-03.33.56:070][ 12]LogNet: Warning: slow frame {i}"
            )
            .unwrap();
        } else {
            writeln!(file, "LogInit: Display: routine message {i}").unwrap();
        }
    }
    file.flush().unwrap();
    file
}

/// Loader that fabricates entries and records every requested range.
/// The call log is shared so the test can inspect it after the session
/// takes ownership of the loader.
struct ScriptedLoader {
    calls: Rc<RefCell<Vec<(u64, u64)>>>,
}

impl LineLoader for ScriptedLoader {
    fn load_range(&mut self, start: u64, end: u64) -> loglens::Result<LogChunk> {
        self.calls.borrow_mut().push((start, end));
        let entries = (start..=end)
            .map(|n| loglens::parser::LogParser::parse_line(n, &format!("LogTest: Display: {n}")))
            .collect();
        Ok(LogChunk {
            start_line: start,
            end_line: end,
            entries,
        })
    }
}

/// The canonical cache scenario: open seeds the preview range, the
/// first ensure fetches one whole gap, the second fetches exactly the
/// missing middle and everything coalesces into a single interval.
#[test]
fn test_gap_fetch_and_merge_scenario() {
    init_tracing_from_env();

    let config = ViewerConfig {
        preview_length: 500,
        ..Default::default()
    };
    let mut session: LogSession<ScriptedLoader> = LogSession::new(config);

    let mut index = loglens::FileIndex::new("scenario.log".to_string(), 0);
    index.total_lines = 1000;
    index.line_offsets = vec![0];
    let preview = (1..=500)
        .map(|n| loglens::parser::LogParser::parse_line(n, &format!("LogTest: Display: {n}")))
        .collect();
    let calls = Rc::new(RefCell::new(Vec::new()));
    session.open_with(index, preview, ScriptedLoader { calls: Rc::clone(&calls) });

    session.ensure_loaded(600, 700).unwrap();
    assert_eq!(*calls.borrow(), vec![(600, 700)]);

    // Only the uncovered middle is fetched; the result coalesces with
    // both neighbors.
    session.ensure_loaded(450, 650).unwrap();
    assert_eq!(*calls.borrow(), vec![(600, 700), (501, 599)]);

    let outcome = session.ensure_loaded(1, 700).unwrap();
    assert_eq!(outcome, LoadOutcome::AlreadyLoaded, "1..=700 must be resident");
    assert!(session.is_loaded(501) && session.is_loaded(599));
    assert!(!session.is_loaded(701));
}

#[test]
fn test_open_search_navigate_highlight() {
    init_tracing_from_env();

    let fixture = log_fixture(1000);
    let mut session = LogSession::default();
    let opened = session.open_file(fixture.path()).unwrap();

    assert_eq!(opened.index.total_lines, 1000);
    assert_eq!(opened.preview.len(), 100);
    assert!(session.is_loaded(100));
    assert!(!session.is_loaded(101));
    // The indexer saw every warning line.
    assert_eq!(opened.index.level_counts.get("Warning"), Some(&10));

    // Search for the warning lines.
    let options = SearchOptions {
        pattern: "slow frame".to_string(),
        ..Default::default()
    };
    let outcome = session.run_search(&options).unwrap();
    assert_eq!(outcome, loglens::SearchOutcome::Completed(10));
    assert_eq!(session.current_match().unwrap().line_number, 100);

    // Jump to the second match; the centered window gets loaded.
    let target = session.next_match().unwrap().line_number;
    assert_eq!(target, 200);
    session.scroll_to_line(target).unwrap();
    assert!(session.is_loaded(target));

    // The match line renders with a search-tagged segment.
    let segments = session.highlights_for_line(target).unwrap();
    let search_segments: Vec<_> = segments
        .iter()
        .filter(|s| {
            s.span
                .as_ref()
                .is_some_and(|sp| sp.source == loglens::SpanSource::Search)
        })
        .collect();
    assert_eq!(search_segments.len(), 1);
    assert_eq!(search_segments[0].text, "slow frame");

    let line: String = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(line, session.entry(target).unwrap().raw);

    // Navigation wraps in both directions.
    for _ in 0..9 {
        session.next_match();
    }
    assert_eq!(session.current_match().unwrap().line_number, 100);
    session.prev_match();
    assert_eq!(session.current_match().unwrap().line_number, 1000);
}

#[test]
fn test_scrolling_viewport_loads_and_noops() {
    init_tracing_from_env();

    let fixture = log_fixture(1000);
    let mut session = LogSession::default();
    session.open_file(fixture.path()).unwrap();

    // First notification inside the preview: nothing to fetch.
    let outcome = session.visible_range_changed(0, 39).unwrap();
    assert_eq!(outcome, LoadOutcome::AlreadyLoaded);

    // Scroll to the middle: lines 500..=539 padded by 50 each way.
    let outcome = session.visible_range_changed(499, 538).unwrap();
    match outcome {
        LoadOutcome::Loaded { fetched } => {
            assert_eq!(fetched, vec![LineRange::new(450, 589)]);
        }
        other => panic!("expected a fetch, got {other:?}"),
    }

    // Re-reporting the same viewport is a no-op.
    let outcome = session.visible_range_changed(499, 538).unwrap();
    assert_eq!(outcome, LoadOutcome::AlreadyLoaded);

    // Entries and auto-highlights are available for the loaded lines.
    let entry = session.entry(520).unwrap();
    assert_eq!(entry.message.as_deref(), Some("routine message 520"));
    let segments = session.highlights_for_line(520).unwrap();
    assert!(segments
        .iter()
        .any(|s| s.span.as_ref().is_some_and(|sp| sp.source == loglens::SpanSource::Number)));
}

#[test]
fn test_auto_highlights_suppressed_on_search_hit_lines_only() {
    init_tracing_from_env();

    let fixture = log_fixture(300);
    let mut session = LogSession::default();
    session.open_file(fixture.path()).unwrap();

    let options = SearchOptions {
        pattern: "slow frame".to_string(),
        ..Default::default()
    };
    session.run_search(&options).unwrap();
    session.scroll_to_line(100).unwrap();

    // Line 100 has a search hit: no auto number highlight on it.
    let segments = session.highlights_for_line(100).unwrap();
    assert!(segments
        .iter()
        .all(|s| s.span.as_ref().map_or(true, |sp| sp.source == loglens::SpanSource::Search)));

    // Line 99 has none: the auto number detector still runs there.
    let segments = session.highlights_for_line(99).unwrap();
    assert!(segments
        .iter()
        .any(|s| s.span.as_ref().is_some_and(|sp| sp.source == loglens::SpanSource::Number)));
}

#[test]
fn test_close_then_reopen_starts_clean() {
    init_tracing_from_env();

    let fixture = log_fixture(200);
    let mut session = LogSession::default();
    session.open_file(fixture.path()).unwrap();
    session
        .run_search(&SearchOptions {
            pattern: "routine".to_string(),
            ..Default::default()
        })
        .unwrap();
    assert!(!session.search_results().is_empty());

    session.close_file();
    assert!(!session.is_open());
    assert!(session.search_results().is_empty());

    let other = log_fixture(50);
    let opened = session.open_file(other.path()).unwrap();
    assert_eq!(opened.index.total_lines, 50);
    assert!(session.is_loaded(50));
    assert_eq!(session.search_results().len(), 0);
}
