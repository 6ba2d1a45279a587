//! Attribute storage for a paged window of a larger table.
//!
//! A [`RegionTableLens`] keeps header rows/cols, one body window and the
//! trailer rows/cols in a dense physical grid. Logical coordinates are
//! translated by [`RegionTableLens::row_n`] / [`RegionTableLens::col_n`];
//! anything outside the materialized area maps to a sentinel index one past
//! the grid, where writes are dropped and reads find nothing.

mod cell_info;
mod interner;

pub use cell_info::{
    Alignment, BorderStyle, Color, Font, HorizontalAlignment, Insets, Side, TableCellInfo,
    VerticalAlignment,
};
pub use interner::CellInfoInterner;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use spanlens_common::{CellRect, CellValue, IntoCellValue, LensError, Result, SpanSize};

use crate::config::LensConfig;
use crate::helpers::{RegionBounds, SpanHelper};
use crate::span::{Span, SpanMap};
use crate::traits::{TableSource, span_coord};

/// Body window in logical coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Region {
    pub const fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self {
            row,
            col,
            rows,
            cols,
        }
    }
}

/// One axis of the logical-to-physical translation.
#[derive(Copy, Clone, Debug, Default)]
struct AxisMap {
    total: usize,
    header: usize,
    body_start: usize,
    body_len: usize,
    trailer: usize,
}

impl AxisMap {
    fn new(total: usize, header: usize, body_start: usize, body_len: usize, trailer: usize) -> Self {
        let header = header.min(total);
        let trailer = trailer.min(total - header);
        let trailer_start = total - trailer;
        let start = body_start.max(header);
        let end = body_start.saturating_add(body_len).min(trailer_start);
        Self {
            total,
            header,
            body_start: start,
            body_len: end.saturating_sub(start),
            trailer,
        }
    }

    fn physical_len(&self) -> usize {
        self.header + self.body_len + self.trailer
    }

    /// Physical index, or `physical_len()` for the sentinel.
    fn physical(&self, logical: usize) -> usize {
        let trailer_start = self.total - self.trailer;
        if logical < self.header {
            logical
        } else if logical >= self.body_start && logical < self.body_start + self.body_len {
            self.header + logical - self.body_start
        } else if logical >= trailer_start && logical < self.total {
            self.header + self.body_len + logical - trailer_start
        } else {
            self.physical_len()
        }
    }

    fn logical(&self, physical: usize) -> usize {
        if physical < self.header {
            physical
        } else if physical < self.header + self.body_len {
            self.body_start + physical - self.header
        } else {
            self.total - self.trailer + physical - self.header - self.body_len
        }
    }
}

/// Dense per-cell attributes and values for a header + body + trailer window.
///
/// Cell records are allocated on first write and shared copy-on-write once
/// [`RegionTableLens::complete`] has interned them.
#[derive(Debug)]
pub struct RegionTableLens {
    rows: AxisMap,
    cols: AxisMap,
    cells: Vec<Option<Arc<TableCellInfo>>>,
    values: Vec<CellValue>,
    row_heights: Vec<Option<u32>>,
    col_widths: Vec<Option<u32>>,
    spans: OnceCell<SpanMap>,
    span_chunk: usize,
    intern: bool,
}

impl RegionTableLens {
    /// `rows x cols` is the logical table size; `region` the body window
    /// kept in memory. Header rows/cols are always kept.
    pub fn new(rows: usize, cols: usize, header_rows: usize, header_cols: usize, region: Region) -> Self {
        let mut lens = Self {
            rows: AxisMap::new(rows, header_rows, region.row, region.rows, 0),
            cols: AxisMap::new(cols, header_cols, region.col, region.cols, 0),
            cells: Vec::new(),
            values: Vec::new(),
            row_heights: Vec::new(),
            col_widths: Vec::new(),
            spans: OnceCell::new(),
            span_chunk: LensConfig::default().span_chunk,
            intern: true,
        };
        lens.allocate();
        lens
    }

    /// Keep the last `trailer_rows` rows and `trailer_cols` columns too.
    /// Resets the storage, so call it before writing.
    pub fn with_trailer(mut self, trailer_rows: usize, trailer_cols: usize) -> Self {
        let r = self.rows;
        let c = self.cols;
        self.rows = AxisMap::new(r.total, r.header, r.body_start, r.body_len, trailer_rows);
        self.cols = AxisMap::new(c.total, c.header, c.body_start, c.body_len, trailer_cols);
        self.allocate();
        self
    }

    pub fn with_config(mut self, config: &LensConfig) -> Self {
        self.span_chunk = config.span_chunk;
        self.intern = config.intern_cell_info;
        self
    }

    fn allocate(&mut self) {
        let prows = self.rows.physical_len();
        let pcols = self.cols.physical_len();
        self.cells = vec![None; prows * pcols];
        self.values = vec![CellValue::Empty; prows * pcols];
        self.row_heights = vec![None; prows];
        self.col_widths = vec![None; pcols];
        self.spans.take();
    }

    /// Materialized body window after clipping to headers and trailers.
    pub fn region(&self) -> Region {
        Region::new(
            self.rows.body_start,
            self.cols.body_start,
            self.rows.body_len,
            self.cols.body_len,
        )
    }

    /// `(rows, cols)` of the physical grid, sentinel excluded.
    pub fn physical_size(&self) -> (usize, usize) {
        (self.rows.physical_len(), self.cols.physical_len())
    }

    /// Physical row of a logical row; `physical_size().0` when outside.
    pub fn row_n(&self, row: usize) -> usize {
        self.rows.physical(row)
    }

    pub fn col_n(&self, col: usize) -> usize {
        self.cols.physical(col)
    }

    fn slot(&self, row: usize, col: usize) -> Option<usize> {
        let pr = self.row_n(row);
        let pc = self.col_n(col);
        let pcols = self.cols.physical_len();
        (pr < self.rows.physical_len() && pc < pcols).then_some(pr * pcols + pc)
    }

    fn update(&mut self, row: usize, col: usize, f: impl FnOnce(&mut TableCellInfo)) -> bool {
        let Some(idx) = self.slot(row, col) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(row, col, "write outside region dropped");
            return false;
        };
        let info = self.cells[idx].get_or_insert_with(Arc::default);
        f(Arc::make_mut(info));
        true
    }

    pub fn cell_info(&self, row: usize, col: usize) -> Option<&TableCellInfo> {
        self.cells[self.slot(row, col)?].as_deref()
    }

    pub fn set_border(&mut self, row: usize, col: usize, side: Side, style: BorderStyle) -> bool {
        self.update(row, col, |info| info.set_border(side, Some(style)))
    }

    pub fn border(&self, row: usize, col: usize, side: Side) -> Option<BorderStyle> {
        self.cell_info(row, col)?.border(side)
    }

    pub fn set_border_color(&mut self, row: usize, col: usize, side: Side, color: Color) -> bool {
        self.update(row, col, |info| info.set_border_color(side, Some(color)))
    }

    pub fn border_color(&self, row: usize, col: usize, side: Side) -> Option<Color> {
        self.cell_info(row, col)?.border_color(side)
    }

    pub fn set_font(&mut self, row: usize, col: usize, font: Font) -> bool {
        self.update(row, col, |info| info.font = Some(font))
    }

    pub fn font(&self, row: usize, col: usize) -> Option<&Font> {
        self.cell_info(row, col)?.font.as_ref()
    }

    pub fn set_foreground(&mut self, row: usize, col: usize, color: Color) -> bool {
        self.update(row, col, |info| info.foreground = Some(color))
    }

    pub fn foreground(&self, row: usize, col: usize) -> Option<Color> {
        self.cell_info(row, col)?.foreground
    }

    pub fn set_background(&mut self, row: usize, col: usize, color: Color) -> bool {
        self.update(row, col, |info| info.background = Some(color))
    }

    pub fn background(&self, row: usize, col: usize) -> Option<Color> {
        self.cell_info(row, col)?.background
    }

    pub fn set_alignment(&mut self, row: usize, col: usize, alignment: Alignment) -> bool {
        self.update(row, col, |info| info.alignment = Some(alignment))
    }

    pub fn alignment(&self, row: usize, col: usize) -> Option<Alignment> {
        self.cell_info(row, col)?.alignment
    }

    pub fn set_insets(&mut self, row: usize, col: usize, insets: Insets) -> bool {
        self.update(row, col, |info| info.insets = Some(insets))
    }

    pub fn insets(&self, row: usize, col: usize) -> Option<Insets> {
        self.cell_info(row, col)?.insets
    }

    pub fn set_wrapping(&mut self, row: usize, col: usize, wrap: bool) -> bool {
        self.update(row, col, |info| info.wrapping = Some(wrap))
    }

    pub fn wrapping(&self, row: usize, col: usize) -> Option<bool> {
        self.cell_info(row, col)?.wrapping
    }

    /// Span anchored at `(row, col)`. `None` clears it.
    pub fn set_span(&mut self, row: usize, col: usize, span: Option<SpanSize>) -> bool {
        let written = self.update(row, col, |info| info.span = span);
        if written {
            self.spans.take();
        }
        written
    }

    /// Checked [`RegionTableLens::set_span`]. The span has to stay inside
    /// one header/body/trailer band and inside the materialized area, and
    /// must not share a cell with another stored span. `None` or a 1x1 size
    /// clears the anchor.
    pub fn try_set_span(&mut self, row: usize, col: usize, span: Option<SpanSize>) -> Result<()> {
        let r = span_coord(row).unwrap_or(i32::MAX);
        let c = span_coord(col).unwrap_or(i32::MAX);
        if self.slot(row, col).is_none() {
            return Err(LensError::OutOfBounds { row: r, col: c });
        }
        if let Some(size) = span.filter(|s| !s.is_degenerate()) {
            let candidate = Span::from_size(r, c, size);
            let mut helper = SpanHelper::new(self.bounds());
            for existing in self.span_map().spans() {
                if (existing.row, existing.col) != (r, c) {
                    helper.record(*existing);
                }
            }
            helper.can_place(&candidate)?;
            // Same band at both ends, so the window holds every cell between.
            let last = (candidate.last_row() as usize, candidate.last_col() as usize);
            if self.slot(last.0, last.1).is_none() {
                return Err(LensError::RegionBoundary { row: r, col: c });
            }
        }
        self.set_span(row, col, span);
        Ok(())
    }

    /// Logical table extent with its header and trailer bands.
    fn bounds(&self) -> RegionBounds {
        let clamp = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
        RegionBounds::new(clamp(self.rows.total), clamp(self.cols.total))
            .with_headers(clamp(self.rows.header), clamp(self.cols.header))
            .with_trailers(clamp(self.rows.trailer), clamp(self.cols.trailer))
    }

    /// Span size stored at an anchor cell.
    pub fn span_size(&self, row: usize, col: usize) -> Option<SpanSize> {
        self.cell_info(row, col)?.span
    }

    pub fn set_object(&mut self, row: usize, col: usize, value: impl IntoCellValue) -> bool {
        match self.slot(row, col) {
            Some(idx) => {
                self.values[idx] = value.into_cell_value();
                true
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::trace!(row, col, "value outside region dropped");
                false
            }
        }
    }

    pub fn set_row_height(&mut self, row: usize, height: Option<u32>) -> bool {
        let pr = self.row_n(row);
        match self.row_heights.get_mut(pr) {
            Some(slot) => {
                *slot = height;
                true
            }
            None => false,
        }
    }

    /// `None` means the default height.
    pub fn row_height(&self, row: usize) -> Option<u32> {
        self.row_heights.get(self.row_n(row)).copied().flatten()
    }

    pub fn set_col_width(&mut self, col: usize, width: Option<u32>) -> bool {
        let pc = self.col_n(col);
        match self.col_widths.get_mut(pc) {
            Some(slot) => {
                *slot = width;
                true
            }
            None => false,
        }
    }

    pub fn col_width(&self, col: usize) -> Option<u32> {
        self.col_widths.get(self.col_n(col)).copied().flatten()
    }

    /// Intern every cell record. Blank records are released. Returns the
    /// number of records now shared with an earlier one.
    pub fn complete(&mut self, interner: &mut CellInfoInterner) -> usize {
        if !self.intern {
            return 0;
        }
        let mut shared = 0;
        for cell in &mut self.cells {
            if complete_slot(cell, interner) {
                shared += 1;
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(shared, distinct = interner.len(), "region cell info interned");
        shared
    }

    pub fn complete_cell(&mut self, row: usize, col: usize, interner: &mut CellInfoInterner) -> bool {
        match self.slot(row, col) {
            Some(idx) => complete_slot(&mut self.cells[idx], interner),
            None => false,
        }
    }

    /// Spans stored at anchor cells, indexed in logical coordinates. Built
    /// on first use; `set_span` discards it.
    pub fn span_map(&self) -> &SpanMap {
        self.spans.get_or_init(|| {
            let pcols = self.cols.physical_len();
            let mut map = SpanMap::with_chunk(self.span_chunk);
            for (idx, cell) in self.cells.iter().enumerate() {
                let Some(size) = cell.as_ref().and_then(|info| info.span) else {
                    continue;
                };
                let row = span_coord(self.rows.logical(idx / pcols));
                let col = span_coord(self.cols.logical(idx % pcols));
                if let (Some(r), Some(c)) = (row, col) {
                    map.add(r, c, size.rows, size.cols);
                }
            }
            map
        })
    }
}

fn complete_slot(cell: &mut Option<Arc<TableCellInfo>>, interner: &mut CellInfoInterner) -> bool {
    let Some(info) = cell else {
        return false;
    };
    if info.is_blank() {
        *cell = None;
        return false;
    }
    let interned = interner.intern(info);
    if Arc::ptr_eq(&interned, info) {
        return false;
    }
    *info = interned;
    true
}

impl TableSource for RegionTableLens {
    fn row_count(&self) -> usize {
        self.rows.total
    }

    fn col_count(&self) -> usize {
        self.cols.total
    }

    fn object(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.values.get(self.slot(row, col)?)
    }

    fn span(&self, row: usize, col: usize) -> Option<CellRect> {
        self.span_map().get(span_coord(row)?, span_coord(col)?)
    }

    fn header_row_count(&self) -> usize {
        self.rows.header
    }

    fn header_col_count(&self) -> usize {
        self.cols.header
    }

    fn trailer_row_count(&self) -> usize {
        self.rows.trailer
    }

    fn trailer_col_count(&self) -> usize {
        self.cols.trailer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_with_header_and_trailer() {
        let lens = RegionTableLens::new(100, 4, 2, 0, Region::new(40, 0, 10, 4)).with_trailer(1, 0);
        assert_eq!(lens.physical_size(), (13, 4));
        assert_eq!(lens.row_n(1), 1);
        assert_eq!(lens.row_n(40), 2);
        assert_eq!(lens.row_n(49), 11);
        assert_eq!(lens.row_n(99), 12);
        assert_eq!(lens.row_n(50), 13);
        assert_eq!(lens.row_n(10), 13);
        assert_eq!(lens.trailer_row_count(), 1);
    }

    #[test]
    fn region_is_clipped_to_header() {
        let lens = RegionTableLens::new(10, 3, 2, 0, Region::new(0, 0, 5, 3));
        assert_eq!(lens.region(), Region::new(2, 0, 3, 3));
        assert_eq!(lens.physical_size(), (5, 3));
    }

    #[test]
    fn setters_allocate_lazily() {
        let mut lens = RegionTableLens::new(4, 4, 1, 1, Region::new(1, 1, 3, 3));
        assert!(lens.cell_info(2, 2).is_none());
        assert!(lens.set_background(2, 2, Color::WHITE));
        assert!(lens.set_border(2, 2, Side::Top, BorderStyle::Thin));
        assert_eq!(lens.background(2, 2), Some(Color::WHITE));
        assert_eq!(lens.border(2, 2, Side::Top), Some(BorderStyle::Thin));
        assert_eq!(lens.border(2, 2, Side::Left), None);
        assert!(lens.cell_info(1, 2).is_none());

        assert!(lens.set_row_height(3, Some(24)));
        assert_eq!(lens.row_height(3), Some(24));
        assert_eq!(lens.row_height(2), None);
        assert!(!lens.set_col_width(9, Some(80)));
    }

    #[test]
    fn complete_shares_identical_records() {
        let mut lens = RegionTableLens::new(3, 3, 0, 0, Region::new(0, 0, 3, 3));
        for col in 0..3 {
            lens.set_font(0, col, Font::new("Sans", 10).bold());
        }
        lens.set_wrapping(1, 1, true);
        lens.set_wrapping(2, 2, true);
        lens.set_wrapping(2, 2, false);

        let mut interner = CellInfoInterner::new();
        assert_eq!(lens.complete(&mut interner), 2);
        assert_eq!(interner.len(), 3);

        lens.set_foreground(0, 1, Color::BLACK);
        assert_eq!(lens.foreground(0, 0), None);
        assert_eq!(lens.foreground(0, 1), Some(Color::BLACK));
        assert_eq!(lens.font(0, 0), lens.font(0, 2));
    }

    #[test]
    fn complete_can_be_disabled() {
        let config = LensConfig {
            intern_cell_info: false,
            ..LensConfig::default()
        };
        let mut lens = RegionTableLens::new(2, 2, 0, 0, Region::new(0, 0, 2, 2)).with_config(&config);
        lens.set_insets(0, 0, Insets::uniform(2));
        lens.set_insets(1, 1, Insets::uniform(2));
        let mut interner = CellInfoInterner::new();
        assert_eq!(lens.complete(&mut interner), 0);
        assert!(interner.is_empty());
        assert!(!lens.complete_cell(0, 0, &mut interner));
        assert!(lens.complete_cell(1, 1, &mut interner));
    }

    #[test]
    fn spans_resolve_in_logical_coordinates() {
        let mut lens = RegionTableLens::new(1000, 5, 1, 0, Region::new(500, 0, 20, 5));
        assert!(lens.set_span(0, 0, Some(SpanSize::new(1, 5))));
        assert!(lens.set_span(505, 1, Some(SpanSize::new(3, 2))));
        assert!(!lens.set_span(10, 1, Some(SpanSize::new(2, 2))));

        assert_eq!(lens.span(0, 3), Some(CellRect::new(-3, 0, 5, 1)));
        assert_eq!(lens.span(507, 2), Some(CellRect::new(-1, -2, 2, 3)));
        assert_eq!(lens.span(508, 2), None);
        assert_eq!(lens.span_map().span_count(), 2);

        lens.set_span(505, 1, None);
        assert_eq!(lens.span(507, 2), None);
    }

    #[test]
    fn checked_span_writes_follow_layout_rules() {
        let mut lens = RegionTableLens::new(100, 4, 1, 0, Region::new(40, 0, 10, 4)).with_trailer(1, 0);

        assert_eq!(lens.try_set_span(41, 0, Some(SpanSize::new(3, 2))), Ok(()));
        assert_eq!(
            lens.try_set_span(42, 1, Some(SpanSize::new(2, 2))),
            Err(LensError::SpanOverlap {
                row: 42,
                col: 1,
                other_row: 41,
                other_col: 0
            })
        );
        // Replacing the span at the same anchor is not a collision.
        assert_eq!(lens.try_set_span(41, 0, Some(SpanSize::new(2, 2))), Ok(()));
        assert_eq!(lens.span_size(41, 0), Some(SpanSize::new(2, 2)));

        assert_eq!(
            lens.try_set_span(0, 0, Some(SpanSize::new(2, 1))),
            Err(LensError::RegionBoundary { row: 0, col: 0 })
        );
        assert_eq!(
            lens.try_set_span(48, 0, Some(SpanSize::new(3, 1))),
            Err(LensError::RegionBoundary { row: 48, col: 0 })
        );
        assert_eq!(
            lens.try_set_span(45, 3, Some(SpanSize::new(1, 2))),
            Err(LensError::OutOfBounds { row: 45, col: 3 })
        );
        assert_eq!(
            lens.try_set_span(10, 0, Some(SpanSize::new(2, 1))),
            Err(LensError::OutOfBounds { row: 10, col: 0 })
        );

        assert_eq!(lens.try_set_span(41, 0, None), Ok(()));
        assert!(lens.span_map().is_empty());
    }
}
