use std::fmt::Debug;

use spanlens_common::{CellRect, CellValue};

/// Base tabular data source the lens layers sit on.
///
/// Only `row_count`, `col_count` and `object` are required; the rest have
/// defaults so a decorator overrides just what it changes.
pub trait TableSource: Debug + Send + Sync {
    /// Rows currently known. May grow for streaming sources.
    fn row_count(&self) -> usize;

    fn col_count(&self) -> usize;

    /// True when `row` exists, waiting for a streaming source if needed.
    fn more_rows(&self, row: usize) -> bool {
        row < self.row_count()
    }

    fn object(&self, row: usize, col: usize) -> Option<&CellValue>;

    /// Span rectangle relative to `(row, col)`; `None` for standalone cells.
    fn span(&self, _row: usize, _col: usize) -> Option<CellRect> {
        None
    }

    fn header_row_count(&self) -> usize {
        0
    }

    fn header_col_count(&self) -> usize {
        0
    }

    fn trailer_row_count(&self) -> usize {
        0
    }

    fn trailer_col_count(&self) -> usize {
        0
    }
}

impl<T: TableSource + ?Sized> TableSource for Box<T> {
    fn row_count(&self) -> usize {
        (**self).row_count()
    }
    fn col_count(&self) -> usize {
        (**self).col_count()
    }
    fn more_rows(&self, row: usize) -> bool {
        (**self).more_rows(row)
    }
    fn object(&self, row: usize, col: usize) -> Option<&CellValue> {
        (**self).object(row, col)
    }
    fn span(&self, row: usize, col: usize) -> Option<CellRect> {
        (**self).span(row, col)
    }
    fn header_row_count(&self) -> usize {
        (**self).header_row_count()
    }
    fn header_col_count(&self) -> usize {
        (**self).header_col_count()
    }
    fn trailer_row_count(&self) -> usize {
        (**self).trailer_row_count()
    }
    fn trailer_col_count(&self) -> usize {
        (**self).trailer_col_count()
    }
}

/// Convert a runtime index to the `i32` space of the span index.
#[inline]
pub(crate) fn span_coord(index: usize) -> Option<i32> {
    i32::try_from(index).ok()
}
