use spanlens_common::{CellValue, IntoCellValue};

use crate::traits::TableSource;

/// Fully materialized table; the simplest `TableSource`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    data: Vec<Vec<CellValue>>,
    cols: usize,
    header_rows: usize,
    header_cols: usize,
}

impl MemoryTable {
    /// `rows x cols` table of empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![vec![CellValue::Empty; cols]; rows],
            cols,
            header_rows: 0,
            header_cols: 0,
        }
    }

    /// Build from row vectors; short rows are padded with empty cells.
    pub fn from_rows<R, V>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: IntoCellValue,
    {
        let mut data: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|r| r.into_iter().map(IntoCellValue::into_cell_value).collect())
            .collect();
        let cols = data.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut data {
            row.resize(cols, CellValue::Empty);
        }
        Self {
            data,
            cols,
            header_rows: 0,
            header_cols: 0,
        }
    }

    pub fn with_headers(mut self, header_rows: usize, header_cols: usize) -> Self {
        self.header_rows = header_rows;
        self.header_cols = header_cols;
        self
    }

    /// Returns false when the cell is outside the table.
    pub fn set(&mut self, row: usize, col: usize, value: impl IntoCellValue) -> bool {
        match self.data.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(slot) => {
                *slot = value.into_cell_value();
                true
            }
            None => false,
        }
    }

    pub fn insert_row(&mut self, at: usize, values: Vec<CellValue>) {
        let mut values = values;
        values.resize(self.cols, CellValue::Empty);
        let at = at.min(self.data.len());
        self.data.insert(at, values);
    }

    pub fn remove_row(&mut self, at: usize) -> Option<Vec<CellValue>> {
        (at < self.data.len()).then(|| self.data.remove(at))
    }

    pub fn insert_col(&mut self, at: usize) {
        let at = at.min(self.cols);
        for row in &mut self.data {
            row.insert(at, CellValue::Empty);
        }
        self.cols += 1;
    }

    pub fn remove_col(&mut self, at: usize) -> bool {
        if at >= self.cols {
            return false;
        }
        for row in &mut self.data {
            row.remove(at);
        }
        self.cols -= 1;
        true
    }
}

impl TableSource for MemoryTable {
    fn row_count(&self) -> usize {
        self.data.len()
    }

    fn col_count(&self) -> usize {
        self.cols
    }

    fn object(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.data.get(row).and_then(|r| r.get(col))
    }

    fn header_row_count(&self) -> usize {
        self.header_rows
    }

    fn header_col_count(&self) -> usize {
        self.header_cols
    }
}
