use std::sync::Arc;

use rustc_hash::FxHashMap;
use spanlens_common::{CellPoint, SpanSize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction a design cell repeats in when its group expands.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Expansion {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Design-time attributes of one calc table cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesignCell {
    pub name: Option<Arc<str>>,
    /// The cell is bound to a group; its name doubles as the group name.
    pub group: bool,
    pub merge_cells: bool,
    pub merge_rows: bool,
    pub merge_cols: bool,
    pub row_group: Option<Arc<str>>,
    pub col_group: Option<Arc<str>>,
    pub expansion: Expansion,
    pub page_after: bool,
    pub span: Option<SpanSize>,
}

impl DesignCell {
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Group cell expanding in `expansion`.
    pub fn group(name: impl Into<Arc<str>>, expansion: Expansion) -> Self {
        Self {
            group: true,
            expansion,
            ..Self::named(name)
        }
    }

    /// Merge equal neighbours in both directions.
    pub fn merged(mut self) -> Self {
        self.merge_cells = true;
        self.merge_rows = true;
        self.merge_cols = true;
        self
    }

    pub fn merge_directions(mut self, rows: bool, cols: bool) -> Self {
        self.merge_cells = rows || cols;
        self.merge_rows = rows;
        self.merge_cols = cols;
        self
    }

    pub fn with_row_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.row_group = Some(group.into());
        self
    }

    pub fn with_col_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.col_group = Some(group.into());
        self
    }

    pub fn with_page_after(mut self) -> Self {
        self.page_after = true;
        self
    }

    pub fn with_span(mut self, rows: i32, cols: i32) -> Self {
        self.span = Some(SpanSize::new(rows, cols));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Static calc table template: a `rows x cols` grid of [`DesignCell`]s.
#[derive(Debug, Clone, Default)]
pub struct CalcTableLayout {
    rows: usize,
    cols: usize,
    header_rows: usize,
    header_cols: usize,
    cells: Vec<DesignCell>,
    names: FxHashMap<Arc<str>, CellPoint>,
}

impl CalcTableLayout {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            header_rows: 0,
            header_cols: 0,
            cells: vec![DesignCell::default(); rows * cols],
            names: FxHashMap::default(),
        }
    }

    pub fn with_headers(mut self, header_rows: usize, header_cols: usize) -> Self {
        self.header_rows = header_rows.min(self.rows);
        self.header_cols = header_cols.min(self.cols);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn header_row_count(&self) -> usize {
        self.header_rows
    }

    pub fn header_col_count(&self) -> usize {
        self.header_cols
    }

    /// Replace the cell at `(row, col)`. Returns false outside the grid.
    /// A later cell reusing a name takes over the name lookup.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: DesignCell) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        let slot = row * self.cols + col;
        if let Some(old) = self.cells[slot].name.take()
            && self.names.get(&old) == Some(&CellPoint::new(row, col))
        {
            self.names.remove(&old);
        }
        if let Some(name) = &cell.name {
            self.names.insert(name.clone(), CellPoint::new(row, col));
        }
        self.cells[slot] = cell;
        true
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&DesignCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    pub fn cell_name(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col)?.name()
    }

    pub fn cell_location(&self, name: &str) -> Option<CellPoint> {
        self.names.get(name).copied()
    }

    pub fn is_merge_cells(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(|c| c.merge_cells)
    }

    /// Names of every cell in the layout, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.keys().map(|n| &**n)
    }
}
