//! Span placement checks.
//!
//! * [`ValidateHelper`] - layout rules: a span stays inside the table and
//!   inside one header/body/trailer band on each axis.
//! * [`CellHelper`] - per-cell questions against a built [`SpanMap`].
//! * [`SpanHelper`] - accumulates placed spans (in any order) and rejects
//!   new ones that collide with them.

use spanlens_common::{LensError, Result};

use crate::interval_tree::IntervalTree;
use crate::span::{Span, SpanMap};

/// Header/body/trailer band of a row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Header,
    Body,
    Trailer,
}

/// Table extent split into header, body and trailer bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionBounds {
    pub rows: i32,
    pub cols: i32,
    pub header_rows: i32,
    pub header_cols: i32,
    pub trailer_rows: i32,
    pub trailer_cols: i32,
}

impl RegionBounds {
    pub fn new(rows: i32, cols: i32) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    pub fn with_headers(mut self, header_rows: i32, header_cols: i32) -> Self {
        self.header_rows = header_rows;
        self.header_cols = header_cols;
        self
    }

    pub fn with_trailers(mut self, trailer_rows: i32, trailer_cols: i32) -> Self {
        self.trailer_rows = trailer_rows;
        self.trailer_cols = trailer_cols;
        self
    }

    pub fn row_band(&self, row: i32) -> Band {
        band(row, self.header_rows, self.rows - self.trailer_rows)
    }

    pub fn col_band(&self, col: i32) -> Band {
        band(col, self.header_cols, self.cols - self.trailer_cols)
    }

    /// First row past the band containing `row`.
    fn row_band_end(&self, row: i32) -> i32 {
        match self.row_band(row) {
            Band::Header => self.header_rows,
            Band::Body => self.rows - self.trailer_rows,
            Band::Trailer => self.rows,
        }
    }

    fn col_band_end(&self, col: i32) -> i32 {
        match self.col_band(col) {
            Band::Header => self.header_cols,
            Band::Body => self.cols - self.trailer_cols,
            Band::Trailer => self.cols,
        }
    }
}

fn band(index: i32, header: i32, trailer_start: i32) -> Band {
    if index < header {
        Band::Header
    } else if index >= trailer_start {
        Band::Trailer
    } else {
        Band::Body
    }
}

/// Checks a proposed span against the table layout.
#[derive(Debug, Clone, Copy)]
pub struct ValidateHelper {
    bounds: RegionBounds,
}

impl ValidateHelper {
    pub fn new(bounds: RegionBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &RegionBounds {
        &self.bounds
    }

    pub fn validate(&self, span: &Span) -> Result<()> {
        if !span.is_valid() {
            return Err(LensError::InvalidSpan {
                row: span.row,
                col: span.col,
                rows: span.rows,
                cols: span.cols,
            });
        }
        let b = &self.bounds;
        if span.last_row() >= b.rows || span.last_col() >= b.cols {
            return Err(LensError::OutOfBounds {
                row: span.row,
                col: span.col,
            });
        }
        if b.row_band(span.row) != b.row_band(span.last_row())
            || b.col_band(span.col) != b.col_band(span.last_col())
        {
            return Err(LensError::RegionBoundary {
                row: span.row,
                col: span.col,
            });
        }
        Ok(())
    }

    /// Shrink `span` to the largest legal span with the same anchor.
    /// `None` when the anchor itself is outside the table or nothing wider
    /// than one cell survives.
    pub fn clip(&self, span: &Span) -> Option<Span> {
        let b = &self.bounds;
        if !span.is_valid() || span.row >= b.rows || span.col >= b.cols {
            return None;
        }
        let rows = span.rows.min(b.row_band_end(span.row) - span.row);
        let cols = span.cols.min(b.col_band_end(span.col) - span.col);
        let clipped = Span::new(span.row, span.col, rows, cols);
        (clipped.is_valid() && !clipped.is_degenerate()).then_some(clipped)
    }
}

/// Per-cell span questions answered from a built `SpanMap`.
#[derive(Debug, Clone, Copy)]
pub struct CellHelper<'a> {
    spans: &'a SpanMap,
}

impl<'a> CellHelper<'a> {
    pub fn new(spans: &'a SpanMap) -> Self {
        Self { spans }
    }

    pub fn span_at(&self, row: i32, col: i32) -> Option<Span> {
        self.spans.find(row, col)
    }

    /// Anchor of the span covering the cell, or the cell itself.
    pub fn anchor(&self, row: i32, col: i32) -> (i32, i32) {
        self.spans.anchor(row, col).unwrap_or((row, col))
    }

    /// Top-left cell of a multi-cell span.
    pub fn is_anchor(&self, row: i32, col: i32) -> bool {
        self.spans
            .get(row, col)
            .is_some_and(|rect| rect.is_anchor())
    }

    /// Interior cell hidden under another cell's span.
    pub fn is_covered(&self, row: i32, col: i32) -> bool {
        self.spans
            .get(row, col)
            .is_some_and(|rect| !rect.is_anchor())
    }

    /// Every cell of `span` except the anchor, row-major.
    pub fn covered_cells(span: Span) -> impl Iterator<Item = (i32, i32)> {
        (span.row..span.row + span.rows)
            .flat_map(move |r| (span.col..span.col + span.cols).map(move |c| (r, c)))
            .skip(1)
    }
}

/// Placement bookkeeping for spans arriving in arbitrary order.
#[derive(Debug, Clone)]
pub struct SpanHelper {
    validator: ValidateHelper,
    placed: IntervalTree<Span>,
}

impl SpanHelper {
    pub fn new(bounds: RegionBounds) -> Self {
        Self {
            validator: ValidateHelper::new(bounds),
            placed: IntervalTree::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn validator(&self) -> &ValidateHelper {
        &self.validator
    }

    /// Placed spans sharing at least one cell with `span`.
    pub fn conflicts(&self, span: &Span) -> Vec<Span> {
        self.placed
            .query(span.row, span.last_row())
            .into_iter()
            .map(|(_, _, s)| *s)
            .filter(|s| s.intersects(span))
            .collect()
    }

    pub fn can_place(&self, span: &Span) -> Result<()> {
        self.validator.validate(span)?;
        if let Some(other) = self.conflicts(span).first() {
            return Err(LensError::SpanOverlap {
                row: span.row,
                col: span.col,
                other_row: other.row,
                other_col: other.col,
            });
        }
        Ok(())
    }

    /// Validate and record. Degenerate spans pass validation but are not
    /// recorded.
    pub fn place(&mut self, span: Span) -> Result<()> {
        if let Err(err) = self.can_place(&span) {
            #[cfg(feature = "tracing")]
            tracing::debug!(%err, row = span.row, col = span.col, "span rejected");
            return Err(err);
        }
        if !span.is_degenerate() {
            self.placed.insert(span.row, span.last_row(), span);
        }
        Ok(())
    }

    /// Record a span that is already in place, skipping validation, so later
    /// placements are checked against it.
    pub fn record(&mut self, span: Span) {
        if span.is_valid() && !span.is_degenerate() {
            self.placed.insert(span.row, span.last_row(), span);
        }
    }

    /// Clip to the layout first, then place if nothing collides.
    pub fn place_clipped(&mut self, span: Span) -> Option<Span> {
        let clipped = self.validator.clip(&span)?;
        self.place(clipped).ok().map(|_| clipped)
    }

    pub fn remove(&mut self, span: &Span) -> bool {
        self.placed.remove(span.row, span.last_row(), span)
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> + '_ {
        self.placed.iter().map(|(_, _, s)| s)
    }

    /// Spans in `(row, col)` order, ready for `SpanMap::add`.
    pub fn into_span_map(self, chunk: usize) -> SpanMap {
        let mut spans: Vec<Span> = self.placed.iter().map(|(_, _, s)| *s).collect();
        spans.sort_by_key(|s| (s.row, s.col));
        let mut map = SpanMap::with_chunk(chunk);
        for s in spans {
            map.add(s.row, s.col, s.rows, s.cols);
        }
        map
    }
}
