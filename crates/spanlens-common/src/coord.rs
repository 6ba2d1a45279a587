//! Grid coordinates shared by the span index, the region store and the
//! calc-table runtime.
//!
//! `CellPoint` is an absolute runtime location. `CellRect` is the *relative*
//! span rectangle handed back by span lookups: `x`/`y` are the (non-positive)
//! offsets from the queried cell to the span's anchor and `width`/`height` are
//! the full span extents. Renderers read the sign convention directly, so the
//! layout of this type is part of the public contract.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute (row, column) location in a runtime table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct CellPoint {
    pub row: usize,
    pub col: usize,
}

impl CellPoint {
    #[inline(always)]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for CellPoint {
    fn from(value: (usize, usize)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<CellPoint> for (usize, usize) {
    fn from(point: CellPoint) -> Self {
        (point.row, point.col)
    }
}

impl fmt::Display for CellPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}C{}", self.row, self.col)
    }
}

/// Row/column extent of a span as stored on its anchor cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SpanSize {
    pub rows: i32,
    pub cols: i32,
}

impl SpanSize {
    pub const ONE: Self = Self { rows: 1, cols: 1 };

    pub const fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// A 1x1 (or smaller) span does not merge anything.
    #[inline(always)]
    pub fn is_degenerate(self) -> bool {
        self.rows <= 1 && self.cols <= 1
    }

    /// Component-wise maximum. Span growth only ever extends.
    pub fn max(self, other: SpanSize) -> SpanSize {
        SpanSize::new(self.rows.max(other.rows), self.cols.max(other.cols))
    }
}

impl Default for SpanSize {
    fn default() -> Self {
        Self::ONE
    }
}

/// Span rectangle relative to the cell it was looked up from.
///
/// * `x`, `y` - offset from the query cell to the anchor (always `<= 0`)
/// * `width`, `height` - full column/row extent of the span
///
/// The far edge relative to the query cell is `x + width` / `y + height`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CellRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the query cell is the span's top-left anchor.
    #[inline(always)]
    pub fn is_anchor(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Anchor row given the row the rectangle was looked up from.
    #[inline(always)]
    pub fn anchor_row(&self, row: i32) -> i32 {
        row + self.y
    }

    /// Anchor column given the column the rectangle was looked up from.
    #[inline(always)]
    pub fn anchor_col(&self, col: i32) -> i32 {
        col + self.x
    }

    /// Rows from the query cell (inclusive) to the bottom edge (exclusive).
    #[inline(always)]
    pub fn rows_remaining(&self) -> i32 {
        self.y + self.height
    }

    /// Columns from the query cell (inclusive) to the right edge (exclusive).
    #[inline(always)]
    pub fn cols_remaining(&self) -> i32 {
        self.x + self.width
    }

    pub fn size(&self) -> SpanSize {
        SpanSize::new(self.height, self.width)
    }
}

impl fmt::Display for CellRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[x={}, y={}, w={}, h={}]",
            self.x, self.y, self.width, self.height
        )
    }
}
