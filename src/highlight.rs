//! Highlight resolution.
//!
//! Per line, annotations from three sources - search matches, user
//! rules, automatic detectors - are folded into one non-overlapping,
//! priority-ordered segmentation the renderer can paint directly.
//! Resolution is a pure function of `(text, rules, search results for
//! the line)`; compiled rule patterns are cached by rule id so rendering
//! does not recompile per line.

use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

use crate::patterns::{HIGHLIGHT_NUMBER, HIGHLIGHT_PATH, HIGHLIGHT_UUID};
use crate::types::SearchResult;

/// Identifier for a user-defined rule, unique within a session.
pub type RuleId = u64;

/// Where a highlight span came from. Priority: search beats custom
/// rules, custom rules beat every automatic detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanSource {
    Search,
    Custom,
    Path,
    Uuid,
    Number,
}

impl SpanSource {
    fn priority(self) -> u8 {
        match self {
            SpanSource::Search => 3,
            SpanSource::Custom => 2,
            SpanSource::Path | SpanSource::Uuid | SpanSource::Number => 1,
        }
    }
}

/// One resolved highlight range within a line. Transient: computed per
/// line per render, never persisted. Offsets are byte positions as
/// produced by the regex engine, always on char boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub source: SpanSource,
    /// Rule color for `Custom` spans; sources without a configured
    /// color leave this empty and the theme decides.
    pub color: Option<String>,
}

impl HighlightSpan {
    fn overlaps(&self, other: &HighlightSpan) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// A piece of a line's text, highlighted or plain. Concatenating the
/// `text` of all segments reproduces the line exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSegment {
    pub text: String,
    pub span: Option<HighlightSpan>,
}

/// User-defined pattern+color annotation. Lives for the whole session,
/// independent of cache and viewport state.
#[derive(Debug, Clone)]
pub struct HighlightRule {
    pub id: RuleId,
    pub pattern: String,
    pub color: String,
    pub enabled: bool,
}

/// Owns the user's highlight rules and the compiled-pattern cache.
///
/// Patterns compile lazily at resolution time, not at add time; a rule
/// that fails to compile simply contributes no matches (and is
/// remembered as broken so it is not re-tried per line).
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<HighlightRule>,
    next_id: RuleId,
    /// `None` marks a pattern that failed to compile.
    compiled: Mutex<HashMap<RuleId, Option<Regex>>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: impl Into<String>, color: impl Into<String>) -> RuleId {
        let id = self.next_id;
        self.next_id += 1;
        self.rules.push(HighlightRule {
            id,
            pattern: pattern.into(),
            color: color.into(),
            enabled: true,
        });
        id
    }

    pub fn remove(&mut self, id: RuleId) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        if let Ok(mut compiled) = self.compiled.lock() {
            compiled.remove(&id);
        }
        self.rules.len() != before
    }

    pub fn set_enabled(&mut self, id: RuleId, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, id: RuleId) -> bool {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = !rule.enabled;
                true
            }
            None => false,
        }
    }

    pub fn rules(&self) -> &[HighlightRule] {
        &self.rules
    }

    /// The compiled regex for a rule, from cache or compiled now.
    /// Returns `None` for an invalid pattern - the failure is logged
    /// once and the rule is inert from then on.
    fn compiled_for(&self, rule: &HighlightRule) -> Option<Regex> {
        let mut compiled = self.compiled.lock().ok()?;
        compiled
            .entry(rule.id)
            .or_insert_with(|| match Regex::new(&rule.pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!(rule = rule.id, pattern = %rule.pattern, %err, "highlight rule failed to compile");
                    None
                }
            })
            .clone()
    }
}

/// Resolve one line into an ordered, gap-free segmentation.
///
/// Automatic detection is suppressed entirely when the line has search
/// results - search takes exclusive precedence over automatic
/// annotation, but not over custom rules. Suppression is per line, not
/// global.
pub fn resolve_line(
    text: &str,
    search_results: &[SearchResult],
    rules: &RuleStore,
) -> Vec<LineSegment> {
    let candidates = collect_candidates(text, search_results, rules);
    let accepted = resolve_overlaps(candidates);
    segment(text, accepted)
}

fn collect_candidates(
    text: &str,
    search_results: &[SearchResult],
    rules: &RuleStore,
) -> Vec<HighlightSpan> {
    let mut candidates = Vec::new();

    for result in search_results {
        if result.start < result.end && result.end <= text.len() {
            candidates.push(HighlightSpan {
                start: result.start,
                end: result.end,
                source: SpanSource::Search,
                color: None,
            });
        }
    }

    for rule in rules.rules().iter().filter(|r| r.enabled) {
        let Some(re) = rules.compiled_for(rule) else {
            continue;
        };
        for m in re.find_iter(text) {
            // Zero-width matches would produce empty segments.
            if m.start() < m.end() {
                candidates.push(HighlightSpan {
                    start: m.start(),
                    end: m.end(),
                    source: SpanSource::Custom,
                    color: Some(rule.color.clone()),
                });
            }
        }
    }

    if search_results.is_empty() {
        let detectors: [(&Regex, SpanSource); 3] = [
            (&*HIGHLIGHT_PATH, SpanSource::Path),
            (&*HIGHLIGHT_UUID, SpanSource::Uuid),
            (&*HIGHLIGHT_NUMBER, SpanSource::Number),
        ];
        for (re, source) in detectors {
            for m in re.find_iter(text) {
                candidates.push(HighlightSpan {
                    start: m.start(),
                    end: m.end(),
                    source,
                    color: None,
                });
            }
        }
    }

    candidates.sort_by_key(|c| c.start);
    candidates
}

/// Greedy overlap resolution in start order. A candidate conflict-checks
/// only against the first overlapping accepted span: a strictly higher
/// priority evicts it in place, equal or lower priority drops the
/// candidate. Deliberately not a full interval-tree resolution; with
/// densely overlapping sources a lower-priority neighbor of the winner
/// can survive, which is acceptable for log text.
fn resolve_overlaps(candidates: Vec<HighlightSpan>) -> Vec<HighlightSpan> {
    let mut accepted: Vec<HighlightSpan> = Vec::new();
    for candidate in candidates {
        match accepted.iter().position(|a| candidate.overlaps(a)) {
            Some(i) => {
                if candidate.source.priority() > accepted[i].source.priority() {
                    accepted[i] = candidate;
                }
            }
            None => accepted.push(candidate),
        }
    }
    // Eviction can leave the list unsorted.
    accepted.sort_by_key(|s| s.start);
    accepted
}

/// Emit alternating plain/highlighted segments covering the full line.
fn segment(text: &str, spans: Vec<HighlightSpan>) -> Vec<LineSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for mut span in spans {
        // Clip defensively: eviction can leave residual overlap, and
        // the output segmentation must stay monotonic.
        let start = span.start.max(cursor);
        let end = span.end.min(text.len());
        if end <= start {
            continue;
        }
        let Some(highlighted) = text.get(start..end) else {
            continue;
        };
        if start > cursor {
            if let Some(plain) = text.get(cursor..start) {
                segments.push(LineSegment {
                    text: plain.to_string(),
                    span: None,
                });
            }
        }
        span.start = start;
        span.end = end;
        segments.push(LineSegment {
            text: highlighted.to_string(),
            span: Some(span),
        });
        cursor = end;
    }

    if cursor < text.len() {
        segments.push(LineSegment {
            text: text[cursor..].to_string(),
            span: None,
        });
    }
    segments
}
