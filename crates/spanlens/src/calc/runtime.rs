use std::sync::Arc;

use spanlens_common::{CellPoint, CellRect, CellValue, IntoCellValue, Lookup};

use super::cell_map::{CalcCellMap, CalcView};
use super::context::CalcCellContext;
use super::index_map::IndexMap;
use super::layout::CalcTableLayout;
use super::post_process::{self, PostProcessSummary};
use super::value_list::ValueListArena;
use crate::config::LensConfig;
use crate::memory::MemoryTable;
use crate::span::SpanMap;
use crate::traits::{TableSource, span_coord};

/// An expanded calc table: runtime data plus the maps back to its design.
///
/// Spans and page breaks are produced by [`RuntimeCalcTable::post_process`];
/// structural edits discard them until the next pass.
#[derive(Debug)]
pub struct RuntimeCalcTable {
    layout: Arc<CalcTableLayout>,
    arena: Arc<ValueListArena>,
    data: MemoryTable,
    rows: IndexMap,
    cols: IndexMap,
    spans: SpanMap,
    page_breaks: Vec<bool>,
    processed: bool,
    cell_map: CalcCellMap,
    config: LensConfig,
}

impl RuntimeCalcTable {
    pub fn new(
        layout: Arc<CalcTableLayout>,
        arena: Arc<ValueListArena>,
        rows: IndexMap,
        cols: IndexMap,
        data: MemoryTable,
    ) -> Self {
        Self::with_config(layout, arena, rows, cols, data, LensConfig::default())
    }

    /// `data` is padded or truncated to `rows.len() x cols.len()`.
    pub fn with_config(
        layout: Arc<CalcTableLayout>,
        arena: Arc<ValueListArena>,
        rows: IndexMap,
        cols: IndexMap,
        mut data: MemoryTable,
        config: LensConfig,
    ) -> Self {
        while data.row_count() < rows.len() {
            data.insert_row(data.row_count(), Vec::new());
        }
        while data.row_count() > rows.len() {
            data.remove_row(data.row_count() - 1);
        }
        while data.col_count() < cols.len() {
            data.insert_col(data.col_count());
        }
        while data.col_count() > cols.len() {
            data.remove_col(data.col_count() - 1);
        }

        let spans = SpanMap::with_chunk(config.span_chunk);
        Self {
            layout,
            arena,
            data,
            rows,
            cols,
            spans,
            page_breaks: Vec::new(),
            processed: false,
            cell_map: CalcCellMap::new(),
            config,
        }
    }

    pub fn layout(&self) -> &CalcTableLayout {
        &self.layout
    }

    pub fn arena(&self) -> &ValueListArena {
        &self.arena
    }

    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    pub fn view(&self) -> CalcView<'_> {
        CalcView {
            layout: &self.layout,
            rows: &self.rows,
            cols: &self.cols,
            precedence: self.config.context_precedence,
        }
    }

    /// Design row of runtime row `row`.
    pub fn row(&self, row: usize) -> Option<usize> {
        self.rows.get(row)
    }

    /// Design column of runtime column `col`.
    pub fn col(&self, col: usize) -> Option<usize> {
        self.cols.get(col)
    }

    pub fn row_map(&self) -> &IndexMap {
        &self.rows
    }

    pub fn col_map(&self) -> &IndexMap {
        &self.cols
    }

    pub fn row_context(&self, row: usize) -> Option<&CalcCellContext> {
        self.rows.cell_context(row)
    }

    pub fn col_context(&self, col: usize) -> Option<&CalcCellContext> {
        self.cols.cell_context(col)
    }

    /// Row and column contexts merged under the configured precedence.
    pub fn cell_context(&self, row: usize, col: usize) -> Option<CalcCellContext> {
        self.view().cell_context(row, col)
    }

    pub fn cell_name(&self, row: usize, col: usize) -> Option<&str> {
        self.cell_map.cell_name(self.view(), row, col)
    }

    /// Every runtime location of design cell `name`.
    pub fn locations(&self, name: &str) -> &[CellPoint] {
        self.cell_map.locations(self.view(), name)
    }

    pub fn location_in_context(&self, name: &str, context: &CalcCellContext) -> Option<CellPoint> {
        self.cell_map.location_in_context(self.view(), name, context)
    }

    /// First runtime row for `design_row` whose groups all hold values.
    pub fn reverse_row(&self, design_row: usize) -> Option<usize> {
        self.rows
            .get_reverse_non_empty(design_row, &self.arena, self.config.reverse_candidates)
    }

    pub fn reverse_col(&self, design_col: usize) -> Option<usize> {
        self.cols
            .get_reverse_non_empty(design_col, &self.arena, self.config.reverse_candidates)
    }

    pub fn set_object(&mut self, row: usize, col: usize, value: impl IntoCellValue) -> bool {
        self.data.set(row, col, value)
    }

    /// Span at a runtime cell; `NotComputed` before the first post-process.
    pub fn span_lookup(&self, row: usize, col: usize) -> Lookup<CellRect> {
        if !self.processed {
            return Lookup::NotComputed;
        }
        match (span_coord(row), span_coord(col)) {
            (Some(r), Some(c)) => self.spans.get(r, c).into(),
            _ => Lookup::Absent,
        }
    }

    pub fn is_page_break_after(&self, row: usize) -> bool {
        self.page_breaks.get(row).copied().unwrap_or(false)
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn span_map(&self) -> &SpanMap {
        &self.spans
    }

    /// Resolve merged cells and page breaks. Replaces the output of any
    /// earlier pass.
    pub fn post_process(&mut self) -> PostProcessSummary {
        let summary = post_process::post_process(self.view(), &self.data, &self.arena, &self.config);
        self.spans.clear();
        for s in &summary.spans {
            self.spans.add(s.row, s.col, s.rows, s.cols);
        }
        self.page_breaks.clone_from(&summary.page_breaks);
        self.processed = true;
        summary
    }

    fn invalidate(&mut self) {
        self.cell_map.reset();
        self.spans.clear();
        self.page_breaks.clear();
        self.processed = false;
    }

    /// Insert a runtime row expanded from `design_row`.
    pub fn insert_row(
        &mut self,
        at: usize,
        design_row: usize,
        context: Option<Arc<CalcCellContext>>,
        values: Vec<CellValue>,
    ) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, design_row, context);
        self.data.insert_row(at, values);
        self.invalidate();
    }

    pub fn remove_row(&mut self, at: usize) -> bool {
        if self.rows.remove(at).is_none() {
            return false;
        }
        self.data.remove_row(at);
        self.invalidate();
        true
    }

    /// Insert an empty runtime column expanded from `design_col`.
    pub fn insert_col(&mut self, at: usize, design_col: usize, context: Option<Arc<CalcCellContext>>) {
        let at = at.min(self.cols.len());
        self.cols.insert(at, design_col, context);
        self.data.insert_col(at);
        self.invalidate();
    }

    pub fn remove_col(&mut self, at: usize) -> bool {
        if self.cols.remove(at).is_none() {
            return false;
        }
        self.data.remove_col(at);
        self.invalidate();
        true
    }
}

impl TableSource for RuntimeCalcTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn col_count(&self) -> usize {
        self.cols.len()
    }

    fn object(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.data.object(row, col)
    }

    fn span(&self, row: usize, col: usize) -> Option<CellRect> {
        self.span_lookup(row, col).present()
    }

    fn header_row_count(&self) -> usize {
        let header = self.layout.header_row_count();
        self.rows.iter().take_while(|(d, _)| *d < header).count()
    }

    fn header_col_count(&self) -> usize {
        let header = self.layout.header_col_count();
        self.cols.iter().take_while(|(d, _)| *d < header).count()
    }
}
