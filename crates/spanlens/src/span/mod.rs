//! Rectangular cell spans and the row-bucketed index over them.
//!
//! A [`Span`] is an absolute rectangle anchored at its top-left cell. Spans
//! whose row ranges overlap share a [`SpanContainer`]; a [`SpanMap`] keeps
//! the containers sorted by row so `get(row, col)` is a binary search over
//! containers followed by a short linear scan.

mod builder;
mod container;
mod span_map;

pub use builder::SpanMapBuilder;
pub use container::SpanContainer;
pub use span_map::{DEFAULT_CHUNK, SpanMap};

use spanlens_common::{CellRect, SpanSize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute span rectangle: anchor `(row, col)` plus `rows x cols` extent.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Span {
    pub row: i32,
    pub col: i32,
    pub rows: i32,
    pub cols: i32,
}

impl Span {
    pub const fn new(row: i32, col: i32, rows: i32, cols: i32) -> Self {
        Self {
            row,
            col,
            rows,
            cols,
        }
    }

    pub fn from_size(row: i32, col: i32, size: SpanSize) -> Self {
        Self::new(row, col, size.rows, size.cols)
    }

    #[inline(always)]
    pub fn last_row(&self) -> i32 {
        self.row + self.rows - 1
    }

    #[inline(always)]
    pub fn last_col(&self) -> i32 {
        self.col + self.cols - 1
    }

    #[inline(always)]
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= self.row
            && row < self.row + self.rows
            && col >= self.col
            && col < self.col + self.cols
    }

    /// True when the two rectangles share at least one cell.
    pub fn intersects(&self, other: &Span) -> bool {
        self.row <= other.last_row()
            && other.row <= self.last_row()
            && self.col <= other.last_col()
            && other.col <= self.last_col()
    }

    /// Anchor inside the grid, both extents at least one cell, and the far
    /// edge representable in `i32`.
    pub fn is_valid(&self) -> bool {
        self.row >= 0
            && self.col >= 0
            && self.rows >= 1
            && self.cols >= 1
            && self.row.checked_add(self.rows).is_some()
            && self.col.checked_add(self.cols).is_some()
    }

    /// 1x1 spans merge nothing and are never stored.
    pub fn is_degenerate(&self) -> bool {
        self.size().is_degenerate()
    }

    pub fn size(&self) -> SpanSize {
        SpanSize::new(self.rows, self.cols)
    }

    /// Rectangle relative to `(row, col)`: negative offsets back to the
    /// anchor, full extents as width/height.
    pub fn relative_to(&self, row: i32, col: i32) -> CellRect {
        CellRect::new(self.col - col, self.row - row, self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_rect_points_back_to_anchor() {
        let span = Span::new(4, 2, 3, 2);
        let rect = span.relative_to(6, 3);
        assert_eq!(rect, CellRect::new(-1, -2, 2, 3));
        assert_eq!(rect.anchor_row(6), 4);
        assert_eq!(rect.anchor_col(3), 2);
        assert!(span.relative_to(4, 2).is_anchor());
    }

    #[test]
    fn containment_is_half_open() {
        let span = Span::new(1, 1, 2, 2);
        assert!(span.contains(1, 1));
        assert!(span.contains(2, 2));
        assert!(!span.contains(3, 1));
        assert!(!span.contains(1, 3));
        assert!(!span.contains(0, 1));
    }

    #[test]
    fn intersection() {
        let a = Span::new(0, 0, 2, 2);
        assert!(a.intersects(&Span::new(1, 1, 2, 2)));
        assert!(!a.intersects(&Span::new(2, 0, 1, 5)));
        assert!(!a.intersects(&Span::new(0, 2, 3, 1)));
    }

    #[test]
    fn degenerate_and_invalid() {
        assert!(Span::new(0, 0, 1, 1).is_degenerate());
        assert!(!Span::new(0, 0, 2, 1).is_degenerate());
        assert!(!Span::new(-1, 0, 2, 1).is_valid());
        assert!(!Span::new(0, 0, 0, 3).is_valid());
        assert!(!Span::new(i32::MAX - 1, 0, 5, 1).is_valid());
        assert!(!Span::new(0, i32::MAX, 1, 2).is_valid());
        assert!(Span::new(i32::MAX - 2, 0, 2, 1).is_valid());
    }
}
