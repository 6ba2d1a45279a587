use std::collections::BTreeMap;

use smallvec::SmallVec;

/// Row-interval index used to find placed spans that may collide with a
/// proposed one.
///
/// ## Design decisions:
///
/// 1. **Short intervals dominate** - Most spans cover a handful of rows
/// 2. **Random insertion order** - Unlike `SpanMap`, placement may happen in
///    any order, so the index cannot rely on sorted appends
/// 3. **Few entries per start row** - Side-by-side spans sharing a first row
///    fit inline in a `SmallVec`
///
/// ## Implementation:
///
/// A `BTreeMap` keyed by the interval's low end; each key holds the
/// `(high, value)` pairs starting there. Queries walk keys `<= q_high` and
/// keep entries whose high end reaches `q_low`.
#[derive(Debug, Clone)]
pub struct IntervalTree<T> {
    map: BTreeMap<i32, SmallVec<[(i32, T); 2]>>,
    /// Longest interval seen; bounds how far left a query has to start.
    max_len: i32,
    size: usize,
}

impl<T> Default for IntervalTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntervalTree<T> {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            max_len: 0,
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.max_len = 0;
        self.size = 0;
    }

    /// Insert `value` for the inclusive interval `[low, high]`.
    pub fn insert(&mut self, low: i32, high: i32, value: T) {
        debug_assert!(low <= high, "interval [{low}, {high}] is reversed");
        self.max_len = self.max_len.max(high - low);
        self.map.entry(low).or_default().push((high, value));
        self.size += 1;
    }

    /// All entries whose interval intersects `[q_low, q_high]`.
    pub fn query(&self, q_low: i32, q_high: i32) -> Vec<(i32, i32, &T)> {
        let mut results = Vec::new();
        if q_low > q_high {
            return results;
        }
        let start = q_low.saturating_sub(self.max_len);
        for (&low, nodes) in self.map.range(start..=q_high) {
            for (high, value) in nodes {
                if *high >= q_low {
                    results.push((low, *high, value));
                }
            }
        }
        results
    }

    /// Iterate all entries in low-end order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &T)> + '_ {
        self.map
            .iter()
            .flat_map(|(&low, nodes)| nodes.iter().map(move |(high, v)| (low, *high, v)))
    }
}

impl<T: PartialEq> IntervalTree<T> {
    pub fn remove(&mut self, low: i32, high: i32, value: &T) -> bool {
        let Some(nodes) = self.map.get_mut(&low) else {
            return false;
        };
        let Some(pos) = nodes.iter().position(|(h, v)| *h == high && v == value) else {
            return false;
        };
        nodes.remove(pos);
        if nodes.is_empty() {
            self.map.remove(&low);
        }
        self.size -= 1;
        true
    }
}
