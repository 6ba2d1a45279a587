use std::sync::atomic::{AtomicUsize, Ordering};

use spanlens_common::{CellRect, LensError, Result};

use super::{Span, SpanContainer};

/// Default number of container slots reserved each time the backing array
/// fills up.
pub const DEFAULT_CHUNK: usize = 64;

/// Row-sorted index of all spans of one table.
///
/// ## Mutation contract
///
/// [`SpanMap::add`] must be called in non-decreasing `(row, col)` order: a
/// span either joins the last container (its first row falls inside the
/// container's rows) or opens a new one. Out-of-order input is *not*
/// detected by `add` and produces wrong lookups; use [`SpanMap::try_add`] or
/// [`super::SpanMapBuilder`] when the input order is not guaranteed.
///
/// ## Concurrent readers
///
/// `get` takes `&self` and may be called from many threads once the map is
/// built. The last-search cache is a single atomic slot that is replaced
/// wholesale, never patched, so a reader can only ever observe a complete
/// record. Mutating while other threads read is not supported; all mutators
/// take `&mut self`.
#[derive(Debug)]
pub struct SpanMap {
    containers: Vec<SpanContainer>,
    chunk: usize,
    /// Container slot + 1 of the last successful search, 0 when empty.
    last: AtomicUsize,
    /// Current mark generation; `get` stamps hit containers with it.
    generation: u64,
    span_count: usize,
    last_anchor: Option<(i32, i32)>,
}

impl Default for SpanMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SpanMap {
    fn clone(&self) -> Self {
        Self {
            containers: self.containers.clone(),
            chunk: self.chunk,
            last: AtomicUsize::new(0),
            generation: self.generation,
            span_count: self.span_count,
            last_anchor: self.last_anchor,
        }
    }
}

impl SpanMap {
    pub fn new() -> Self {
        Self::with_chunk(DEFAULT_CHUNK)
    }

    /// Grow the container array `chunk` slots at a time.
    pub fn with_chunk(chunk: usize) -> Self {
        let chunk = chunk.max(1);
        Self {
            containers: Vec::with_capacity(chunk),
            chunk,
            last: AtomicUsize::new(0),
            generation: 0,
            span_count: 0,
            last_anchor: None,
        }
    }

    /// Number of containers.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn span_count(&self) -> usize {
        self.span_count
    }

    pub fn containers(&self) -> &[SpanContainer] {
        &self.containers
    }

    /// All spans in insertion order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> + '_ {
        self.containers.iter().flat_map(|c| c.spans().iter())
    }

    pub fn clear(&mut self) {
        self.containers.clear();
        self.span_count = 0;
        self.last_anchor = None;
        *self.last.get_mut() = 0;
    }

    /// Append a span. Degenerate (1x1) and invalid spans are ignored.
    ///
    /// Callers must supply spans in non-decreasing `(row, col)` order.
    pub fn add(&mut self, row: i32, col: i32, rows: i32, cols: i32) {
        let span = Span::new(row, col, rows, cols);
        if !span.is_valid() || span.is_degenerate() {
            return;
        }
        self.append(span);
    }

    /// Checked variant of [`SpanMap::add`]: rejects invalid spans, spans
    /// anchored before the previously added one, and spans sharing a cell
    /// with an existing span. Degenerate spans are accepted and ignored.
    pub fn try_add(&mut self, row: i32, col: i32, rows: i32, cols: i32) -> Result<()> {
        let span = Span::new(row, col, rows, cols);
        if !span.is_valid() {
            return Err(LensError::InvalidSpan {
                row,
                col,
                rows,
                cols,
            });
        }
        if span.is_degenerate() {
            return Ok(());
        }
        if let Some((last_row, last_col)) = self.last_anchor
            && (row, col) < (last_row, last_col)
        {
            return Err(LensError::SpanOutOfOrder {
                row,
                col,
                last_row,
                last_col,
            });
        }
        // Sorted input: only the last container can reach down to `row`.
        if let Some(last) = self.containers.last()
            && let Some(other) = last.spans().iter().find(|s| s.intersects(&span))
        {
            return Err(LensError::SpanOverlap {
                row,
                col,
                other_row: other.row,
                other_col: other.col,
            });
        }
        self.append(span);
        Ok(())
    }

    fn append(&mut self, span: Span) {
        match self.containers.last_mut() {
            Some(last) if span.row <= last.bottom() => last.push(span),
            _ => {
                if self.containers.len() == self.containers.capacity() {
                    self.containers.reserve(self.chunk);
                }
                self.containers
                    .push(SpanContainer::new(span, self.generation));
            }
        }
        self.span_count += 1;
        self.last_anchor = Some((span.row, span.col));
    }

    /// Span rectangle relative to `(row, col)`, or `None` when the cell is
    /// standalone or the coordinates are negative.
    pub fn get(&self, row: i32, col: i32) -> Option<CellRect> {
        self.find(row, col).map(|span| span.relative_to(row, col))
    }

    /// Anchor `(row, col)` of the span covering the cell.
    pub fn anchor(&self, row: i32, col: i32) -> Option<(i32, i32)> {
        self.find(row, col).map(|span| (span.row, span.col))
    }

    /// The absolute span covering `(row, col)`. Marks the container.
    pub fn find(&self, row: i32, col: i32) -> Option<Span> {
        if row < 0 || col < 0 {
            return None;
        }
        let slot = self.locate(row)?;
        let container = &self.containers[slot];
        let span = container.find(row, col)?;
        container.mark(self.generation);
        Some(*span)
    }

    fn locate(&self, row: i32) -> Option<usize> {
        let cached = self.last.load(Ordering::Relaxed);
        if cached != 0
            && let Some(c) = self.containers.get(cached - 1)
            && c.covers_row(row)
        {
            return Some(cached - 1);
        }

        let slot = self.containers.partition_point(|c| c.bottom() < row);
        let container = self.containers.get(slot)?;
        if !container.covers_row(row) {
            return None;
        }
        self.last.store(slot + 1, Ordering::Relaxed);
        Some(slot)
    }

    /// Extend every span anchored at `row` by `height` rows. Containers that
    /// now overlap are coalesced so the row-disjoint invariant holds.
    pub fn adjust(&mut self, row: i32, height: i32) -> bool {
        if height <= 0 || row < 0 {
            return false;
        }
        let slot = self.containers.partition_point(|c| c.bottom() < row);
        let changed = match self.containers.get_mut(slot) {
            Some(c) if c.covers_row(row) => c.grow_at(row, height),
            _ => false,
        };
        if !changed {
            return false;
        }

        while slot + 1 < self.containers.len()
            && self.containers[slot + 1].top() <= self.containers[slot].bottom()
        {
            let next = self.containers.remove(slot + 1);
            self.containers[slot].absorb(next);
        }
        *self.last.get_mut() = 0;
        true
    }

    /// Start a new mark generation. Containers hit by `get` from now on
    /// survive the next [`SpanMap::trim`].
    pub fn mark(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Drop every container not hit since the last [`SpanMap::mark`].
    /// Returns the number of containers removed.
    pub fn trim(&mut self) -> usize {
        let before = self.containers.len();
        let generation = self.generation;
        self.containers.retain(|c| c.is_marked(generation));
        self.span_count = self.containers.iter().map(SpanContainer::len).sum();
        *self.last.get_mut() = 0;

        let removed = before - self.containers.len();
        #[cfg(feature = "tracing")]
        tracing::debug!(removed, remaining = self.containers.len(), "span map trimmed");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpanMap {
        let mut map = SpanMap::new();
        map.add(0, 0, 2, 2);
        map.add(1, 3, 3, 1);
        map.add(6, 1, 2, 1);
        map.add(10, 0, 1, 4);
        map
    }

    #[test]
    fn overlapping_rows_share_a_container() {
        let map = sample();
        assert_eq!(map.len(), 3);
        assert_eq!(map.span_count(), 4);
        assert_eq!(map.containers()[0].bottom(), 3);
    }

    #[test]
    fn get_returns_relative_rect() {
        let map = sample();
        assert_eq!(map.get(0, 0), Some(CellRect::new(0, 0, 2, 2)));
        assert_eq!(map.get(1, 1), Some(CellRect::new(-1, -1, 2, 2)));
        assert_eq!(map.get(3, 3), Some(CellRect::new(0, -2, 1, 3)));
        assert_eq!(map.get(10, 3), Some(CellRect::new(-3, 0, 4, 1)));
        assert_eq!(map.get(2, 0), None);
        assert_eq!(map.get(5, 5), None);
        assert_eq!(map.get(-1, 0), None);
        assert_eq!(map.get(0, -1), None);
    }

    #[test]
    fn degenerate_spans_are_ignored() {
        let mut map = SpanMap::new();
        map.add(0, 0, 1, 1);
        map.add(-1, 0, 3, 3);
        assert!(map.is_empty());
        assert!(map.try_add(0, 0, 1, 1).is_ok());
        assert!(map.is_empty());
    }

    #[test]
    fn cache_survives_alternating_lookups() {
        let map = sample();
        for _ in 0..3 {
            assert_eq!(map.anchor(7, 1), Some((6, 1)));
            assert_eq!(map.anchor(1, 1), Some((0, 0)));
            assert_eq!(map.anchor(7, 0), None);
        }
    }

    #[test]
    fn try_add_rejects_out_of_order_and_overlap() {
        let mut map = SpanMap::new();
        map.try_add(2, 2, 2, 2).unwrap();
        assert_eq!(
            map.try_add(1, 0, 2, 1),
            Err(LensError::SpanOutOfOrder {
                row: 1,
                col: 0,
                last_row: 2,
                last_col: 2
            })
        );
        assert_eq!(
            map.try_add(3, 3, 2, 2),
            Err(LensError::SpanOverlap {
                row: 3,
                col: 3,
                other_row: 2,
                other_col: 2
            })
        );
        assert!(matches!(
            map.try_add(3, 0, 0, 2),
            Err(LensError::InvalidSpan { .. })
        ));
    }

    #[test]
    fn far_edge_overflow_is_rejected_not_panicking() {
        let mut map = SpanMap::new();
        assert_eq!(
            map.try_add(i32::MAX - 1, 0, 5, 1),
            Err(LensError::InvalidSpan {
                row: i32::MAX - 1,
                col: 0,
                rows: 5,
                cols: 1
            })
        );
        map.add(0, i32::MAX - 1, 1, 3);
        assert!(map.is_empty());

        map.add(i32::MAX - 3, 0, 2, 1);
        assert!(map.adjust(i32::MAX - 3, i32::MAX));
        assert_eq!(map.anchor(i32::MAX - 1, 0), Some((i32::MAX - 3, 0)));

        let mut builder = crate::span::SpanMapBuilder::new();
        builder.push(i32::MAX, 0, 2, 2);
        assert!(matches!(builder.build(), Err(LensError::InvalidSpan { .. })));
        map.try_add(3, 4, 2, 1).unwrap();
        assert_eq!(map.span_count(), 2);
    }

    #[test]
    fn adjust_grows_and_coalesces() {
        let mut map = SpanMap::new();
        map.add(0, 0, 2, 1);
        map.add(4, 1, 2, 1);
        assert_eq!(map.len(), 2);

        assert!(map.adjust(0, 3));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(4, 1), Some(CellRect::new(0, 0, 1, 2)));
        assert_eq!(map.get(3, 0), Some(CellRect::new(0, -3, 1, 5)));
        assert!(!map.adjust(2, 1));
        assert!(!map.adjust(0, 0));
    }

    #[test]
    fn trim_drops_unmarked_containers() {
        let mut map = sample();
        map.mark();
        assert!(map.get(7, 1).is_some());
        assert_eq!(map.trim(), 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.span_count(), 1);
        assert_eq!(map.get(6, 1), Some(CellRect::new(0, 0, 1, 2)));
        assert_eq!(map.get(0, 0), None);
    }

    #[test]
    fn trim_without_mark_keeps_everything() {
        let mut map = sample();
        assert_eq!(map.trim(), 0);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn spans_added_after_mark_survive_trim() {
        let mut map = sample();
        map.mark();
        map.add(20, 0, 2, 2);
        assert_eq!(map.trim(), 3);
        assert_eq!(map.anchor(21, 1), Some((20, 0)));
    }

    #[test]
    fn concurrent_readers_agree() {
        let mut map = SpanMap::with_chunk(4);
        for i in 0..200 {
            map.add(i * 3, i % 5, 2, 2);
        }
        std::thread::scope(|s| {
            for t in 0..4 {
                let map = &map;
                s.spawn(move || {
                    for i in (t..200).step_by(4) {
                        let row = i * 3 + 1;
                        let col = i % 5 + 1;
                        assert_eq!(map.get(row, col), Some(CellRect::new(-1, -1, 2, 2)));
                        assert_eq!(map.get(row + 1, col), None);
                    }
                });
            }
        });
    }
}
