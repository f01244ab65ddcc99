//! Sorted, disjoint line intervals and gap computation.
//!
//! [`RangeSet`] tracks which contiguous line ranges are already resident
//! in memory; [`RangeSet::gaps`] computes the minimal fetch list for a
//! newly visible window. Pure data structure, no I/O.

use serde::{Deserialize, Serialize};

/// An inclusive interval of 1-based line numbers, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u64,
    pub end: u64,
}

impl LineRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "LineRange requires start <= end");
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn contains_line(&self, line: u64) -> bool {
        self.start <= line && line <= self.end
    }

    /// True when the two ranges overlap or are adjacent, i.e. their
    /// union is a single contiguous range.
    pub fn touches(&self, other: &LineRange) -> bool {
        self.start <= other.end.saturating_add(1) && other.start <= self.end.saturating_add(1)
    }

    /// Clamp to `1..=total`. Returns `None` when nothing remains.
    pub fn clamped(&self, total: u64) -> Option<LineRange> {
        let start = self.start.max(1);
        let end = self.end.min(total);
        (start <= end).then(|| LineRange::new(start, end))
    }
}

/// An ordered sequence of pairwise disjoint, non-adjacent intervals.
///
/// The normalization invariant: after every mutation, no two members
/// satisfy `a.end + 1 >= b.start`, and members are sorted by `start`.
#[derive(Debug, Clone, Default)]
pub struct RangeSet {
    ranges: Vec<LineRange>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[LineRange] {
        &self.ranges
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    pub fn covers_line(&self, line: u64) -> bool {
        self.covering_index(line).is_some()
    }

    /// True when every line of `query` is covered. Because the set is
    /// normalized, full coverage can only come from a single member.
    pub fn covers(&self, query: LineRange) -> bool {
        match self.covering_index(query.start) {
            Some(i) => self.ranges[i].end >= query.end,
            None => false,
        }
    }

    /// Index of the member covering `line`, if any.
    fn covering_index(&self, line: u64) -> Option<usize> {
        let idx = self.ranges.partition_point(|r| r.start <= line);
        if idx == 0 {
            return None;
        }
        self.ranges[idx - 1].contains_line(line).then(|| idx - 1)
    }

    /// Merge-insert: add `new`, then coalesce any members that now touch
    /// into one, keeping the sort by `start`.
    pub fn insert(&mut self, new: LineRange) {
        let idx = self.ranges.partition_point(|r| r.start < new.start);
        self.ranges.insert(idx, new);

        // Only the neighborhood of the insertion can need coalescing:
        // start one slot left and fold touching pairs rightward.
        let mut i = idx.saturating_sub(1);
        while i + 1 < self.ranges.len() {
            if self.ranges[i].end.saturating_add(1) >= self.ranges[i + 1].start {
                self.ranges[i].end = self.ranges[i].end.max(self.ranges[i + 1].end);
                self.ranges.remove(i + 1);
            } else if i < idx {
                i += 1;
            } else {
                break;
            }
        }
    }

    /// The ordered list of maximal sub-intervals of `query` not covered
    /// by any member. `query` must already be clamped to the file
    /// bounds; clamping never happens here.
    pub fn gaps(&self, query: LineRange) -> Vec<LineRange> {
        let mut gaps = Vec::new();
        let mut cursor = query.start;

        for r in &self.ranges {
            if r.end < query.start {
                continue;
            }
            if r.start > query.end {
                break;
            }
            if r.start > cursor {
                gaps.push(LineRange::new(cursor, (r.start - 1).min(query.end)));
            }
            cursor = cursor.max(r.end.saturating_add(1));
            if cursor > query.end {
                break;
            }
        }

        if cursor <= query.end {
            gaps.push(LineRange::new(cursor, query.end));
        }
        gaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set_of(ranges: &[(u64, u64)]) -> RangeSet {
        let mut set = RangeSet::new();
        for &(s, e) in ranges {
            set.insert(LineRange::new(s, e));
        }
        set
    }

    #[test]
    fn test_insert_into_empty() {
        let set = set_of(&[(5, 10)]);
        assert_eq!(set.ranges(), &[LineRange::new(5, 10)]);
    }

    #[test]
    fn test_insert_coalesces_bridging_range() {
        // {5,10} bridges {1,4} and {11,15} into a single interval.
        let set = set_of(&[(1, 4), (11, 15), (5, 10)]);
        assert_eq!(set.ranges(), &[LineRange::new(1, 15)]);
    }

    #[test]
    fn test_insert_is_idempotent_for_covered_range() {
        let mut set = set_of(&[(1, 100)]);
        set.insert(LineRange::new(20, 30));
        assert_eq!(set.ranges(), &[LineRange::new(1, 100)]);
    }

    #[test]
    fn test_insert_coalesces_adjacent_not_overlapping() {
        let set = set_of(&[(1, 4), (5, 9)]);
        assert_eq!(set.ranges(), &[LineRange::new(1, 9)]);
    }

    #[test]
    fn test_insert_keeps_disjoint_ranges_sorted() {
        let set = set_of(&[(20, 30), (1, 5), (40, 45)]);
        assert_eq!(
            set.ranges(),
            &[
                LineRange::new(1, 5),
                LineRange::new(20, 30),
                LineRange::new(40, 45)
            ]
        );
    }

    #[test]
    fn test_gaps_of_empty_set_is_whole_query() {
        let set = RangeSet::new();
        let gaps = set.gaps(LineRange::new(3, 9));
        assert_eq!(gaps, vec![LineRange::new(3, 9)]);
    }

    #[test]
    fn test_gaps_of_fully_covered_query_is_empty() {
        let set = set_of(&[(1, 100)]);
        assert!(set.gaps(LineRange::new(10, 20)).is_empty());
    }

    #[test]
    fn test_gaps_minimality() {
        let set = set_of(&[(1, 4), (11, 15)]);
        let gaps = set.gaps(LineRange::new(1, 15));
        assert_eq!(gaps, vec![LineRange::new(5, 10)]);
    }

    #[test]
    fn test_gaps_leading_and_trailing() {
        let set = set_of(&[(5, 6)]);
        let gaps = set.gaps(LineRange::new(1, 10));
        assert_eq!(gaps, vec![LineRange::new(1, 4), LineRange::new(7, 10)]);
    }

    #[test]
    fn test_covers_spanning_query_requires_single_member() {
        let set = set_of(&[(1, 4), (6, 10)]);
        assert!(!set.covers(LineRange::new(2, 8)));
        assert!(set.covers(LineRange::new(6, 10)));
        assert!(!set.covers(LineRange::new(5, 5)));
    }

    proptest! {
        /// Gap completeness: the union of gaps and covered lines
        /// reconstructs the query exactly, with no overlap.
        #[test]
        fn prop_gaps_partition_query(
            ranges in proptest::collection::vec((1u64..200, 0u64..20), 0..12),
            qs in 1u64..200,
            qlen in 0u64..60,
        ) {
            let mut set = RangeSet::new();
            for (s, len) in ranges {
                set.insert(LineRange::new(s, s + len));
            }
            let query = LineRange::new(qs, qs + qlen);
            let gaps = set.gaps(query);

            for line in query.start..=query.end {
                let in_gap = gaps.iter().any(|g| g.contains_line(line));
                let covered = set.covers_line(line);
                prop_assert!(
                    in_gap != covered,
                    "line {} must be in exactly one of gaps/covered",
                    line
                );
            }
            // Gaps are ordered, disjoint, and inside the query.
            for w in gaps.windows(2) {
                prop_assert!(w[0].end + 1 < w[1].start);
            }
            for g in &gaps {
                prop_assert!(g.start >= query.start && g.end <= query.end);
            }
        }

        /// Normalization: after arbitrary inserts the set is sorted and
        /// non-adjacent.
        #[test]
        fn prop_insert_keeps_normalized(
            ranges in proptest::collection::vec((1u64..200, 0u64..20), 1..16),
        ) {
            let mut set = RangeSet::new();
            for (s, len) in ranges {
                set.insert(LineRange::new(s, s + len));
            }
            for w in set.ranges().windows(2) {
                prop_assert!(w[0].end + 1 < w[1].start, "members must stay non-adjacent");
            }
        }

        /// Idempotence: re-inserting any member leaves the set unchanged.
        #[test]
        fn prop_reinsert_member_is_noop(
            ranges in proptest::collection::vec((1u64..200, 0u64..20), 1..12),
        ) {
            let mut set = RangeSet::new();
            for (s, len) in ranges {
                set.insert(LineRange::new(s, s + len));
            }
            let before = set.ranges().to_vec();
            for r in before.clone() {
                set.insert(r);
            }
            prop_assert_eq!(set.ranges(), &before[..]);
        }
    }
}
