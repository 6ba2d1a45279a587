use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use super::Span;

/// All spans whose row ranges overlap, with the row extent of their union.
///
/// Containers are small in practice (a handful of spans side by side on the
/// same rows), so lookups inside one are a linear scan.
#[derive(Debug)]
pub struct SpanContainer {
    top: i32,
    /// Inclusive.
    bottom: i32,
    spans: SmallVec<[Span; 4]>,
    /// Mark generation of the last `get` that hit this container.
    stamp: AtomicU64,
}

impl SpanContainer {
    pub(crate) fn new(span: Span, generation: u64) -> Self {
        let mut spans = SmallVec::new();
        spans.push(span);
        Self {
            top: span.row,
            bottom: span.last_row(),
            spans,
            stamp: AtomicU64::new(generation),
        }
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    #[inline(always)]
    pub fn covers_row(&self, row: i32) -> bool {
        row >= self.top && row <= self.bottom
    }

    /// The span covering `(row, col)`, if any.
    pub fn find(&self, row: i32, col: i32) -> Option<&Span> {
        self.spans.iter().find(|s| s.contains(row, col))
    }

    pub(crate) fn push(&mut self, span: Span) {
        self.bottom = self.bottom.max(span.last_row());
        self.spans.push(span);
    }

    /// Grow every span anchored at `row` by `height` rows.
    pub(crate) fn grow_at(&mut self, row: i32, height: i32) -> bool {
        let mut changed = false;
        for span in self.spans.iter_mut().filter(|s| s.row == row) {
            span.rows = span.rows.saturating_add(height).min(i32::MAX - span.row);
            self.bottom = self.bottom.max(span.last_row());
            changed = true;
        }
        changed
    }

    /// Absorb a following container whose rows now overlap this one.
    pub(crate) fn absorb(&mut self, other: SpanContainer) {
        self.bottom = self.bottom.max(other.bottom);
        self.spans.extend(other.spans);
    }

    #[inline(always)]
    pub(crate) fn mark(&self, generation: u64) {
        self.stamp.store(generation, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn is_marked(&self, generation: u64) -> bool {
        self.stamp.load(Ordering::Relaxed) == generation
    }
}

impl Clone for SpanContainer {
    fn clone(&self) -> Self {
        Self {
            top: self.top,
            bottom: self.bottom,
            spans: self.spans.clone(),
            stamp: AtomicU64::new(self.stamp.load(Ordering::Relaxed)),
        }
    }
}
