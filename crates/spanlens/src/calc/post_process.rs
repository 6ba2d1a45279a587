//! Merge-span and page-break resolution over an expanded calc table.
//!
//! Cells are visited row-major. A merge-eligible cell grows down while the
//! next runtime row comes from the same design row, holds an equal value and
//! agrees on every group of the cell's row-group chain; it grows right the
//! same way over columns. The run is combined with the design span (larger
//! extent wins) and then shrunk so it never covers a cell another span
//! already owns.

use std::sync::Arc;

use spanlens_common::{CellValue, Lookup, SpanSize};

use super::cell_map::CalcView;
use super::context::CalcCellContext;
use super::layout::DesignCell;
use super::value_list::ValueListArena;
use crate::config::LensConfig;
use crate::span::Span;
use crate::traits::{TableSource, span_coord};

/// Outcome of one post-processing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessSummary {
    /// Spans produced, in `(row, col)` order.
    pub spans: Vec<Span>,
    /// `page_breaks[i]`: a page break follows runtime row `i`.
    pub page_breaks: Vec<bool>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MergeSlot {
    Pending,
    Standalone,
    Anchor(SpanSize),
    Covered,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Axis {
    Rows,
    Cols,
}

impl Axis {
    fn parent(self, cell: &DesignCell) -> Option<&Arc<str>> {
        match self {
            Axis::Rows => cell.row_group.as_ref(),
            Axis::Cols => cell.col_group.as_ref(),
        }
    }
}

struct MergePass<'a> {
    view: CalcView<'a>,
    data: &'a dyn TableSource,
    arena: &'a ValueListArena,
    nrows: usize,
    ncols: usize,
    slots: Vec<MergeSlot>,
    contexts: Vec<Lookup<CalcCellContext>>,
}

impl<'a> MergePass<'a> {
    fn new(view: CalcView<'a>, data: &'a dyn TableSource, arena: &'a ValueListArena) -> Self {
        let nrows = view.rows.len();
        let ncols = view.cols.len();
        Self {
            view,
            data,
            arena,
            nrows,
            ncols,
            slots: vec![MergeSlot::Pending; nrows * ncols],
            contexts: vec![Lookup::NotComputed; nrows * ncols],
        }
    }

    #[inline]
    fn slot(&self, row: usize, col: usize) -> MergeSlot {
        self.slots[row * self.ncols + col]
    }

    #[inline]
    fn set_slot(&mut self, row: usize, col: usize, slot: MergeSlot) {
        self.slots[row * self.ncols + col] = slot;
    }

    fn value(&self, row: usize, col: usize) -> Option<&'a CellValue> {
        self.data.object(row, col)
    }

    fn ensure_context(&mut self, row: usize, col: usize) {
        let idx = row * self.ncols + col;
        if !self.contexts[idx].is_computed() {
            self.contexts[idx] = self.view.cell_context(row, col).into();
        }
    }

    /// Group names whose values must agree along `axis`: the cell's own
    /// group, then each enclosing group. A name with no cell behind it ends
    /// the chain.
    fn group_chain(&self, cell: &DesignCell, axis: Axis) -> Vec<Arc<str>> {
        let layout = self.view.layout;
        let mut chain: Vec<Arc<str>> = Vec::new();
        if cell.group
            && let Some(name) = &cell.name
        {
            chain.push(name.clone());
        }
        let mut parent = axis.parent(cell).cloned();
        while let Some(name) = parent {
            if chain.contains(&name) {
                break;
            }
            let Some(loc) = layout.cell_location(&name) else {
                #[cfg(feature = "tracing")]
                tracing::debug!(group = %name, "dangling group reference ends merge chain");
                break;
            };
            parent = layout
                .cell(loc.row, loc.col)
                .and_then(|c| axis.parent(c).cloned());
            chain.push(name);
        }
        chain
    }

    fn groups_agree(&mut self, a: (usize, usize), b: (usize, usize), chain: &[Arc<str>]) -> bool {
        if chain.is_empty() {
            return true;
        }
        let arena = self.arena;
        self.ensure_context(a.0, a.1);
        self.ensure_context(b.0, b.1);
        let ctx_a = self.contexts[a.0 * self.ncols + a.1].as_ref().present();
        let ctx_b = self.contexts[b.0 * self.ncols + b.1].as_ref().present();
        chain.iter().all(|name| {
            ctx_a.and_then(|c| c.group_value(name, arena))
                == ctx_b.and_then(|c| c.group_value(name, arena))
        })
    }

    fn vertical_run(&mut self, row: usize, col: usize, design_row: usize, chain: &[Arc<str>]) -> usize {
        let value = self.value(row, col);
        let mut end = row + 1;
        while end < self.nrows
            && self.data.more_rows(end)
            && self.view.rows.get(end) == Some(design_row)
            && self.value(end, col) == value
            && self.groups_agree((row, col), (end, col), chain)
        {
            end += 1;
        }
        end - row
    }

    fn horizontal_run(&mut self, row: usize, col: usize, design_col: usize, chain: &[Arc<str>]) -> usize {
        let value = self.value(row, col);
        let mut end = col + 1;
        while end < self.ncols
            && self.view.cols.get(end) == Some(design_col)
            && self.value(row, end) == value
            && self.groups_agree((row, col), (row, end), chain)
        {
            end += 1;
        }
        end - col
    }

    /// Largest extent up to `target` whose cells are all still pending.
    fn claim(&mut self, row: usize, col: usize, target: SpanSize) -> SpanSize {
        let want_rows = usize::try_from(target.rows).unwrap_or(1).max(1);
        let want_cols = usize::try_from(target.cols).unwrap_or(1).max(1);

        let mut rows = 1;
        while rows < want_rows
            && row + rows < self.nrows
            && self.slot(row + rows, col) == MergeSlot::Pending
        {
            rows += 1;
        }
        let mut cols = 1;
        while cols < want_cols
            && col + cols < self.ncols
            && (0..rows).all(|r| self.slot(row + r, col + cols) == MergeSlot::Pending)
        {
            cols += 1;
        }

        for r in row..row + rows {
            for c in col..col + cols {
                self.set_slot(r, c, MergeSlot::Covered);
            }
        }
        SpanSize::new(rows as i32, cols as i32)
    }

    fn run(mut self, merge_cells: bool) -> Vec<Span> {
        let layout = self.view.layout;
        for row in 0..self.nrows {
            for col in 0..self.ncols {
                if self.slot(row, col) != MergeSlot::Pending {
                    continue;
                }
                let design = self
                    .view
                    .rows
                    .get(row)
                    .zip(self.view.cols.get(col))
                    .and_then(|(dr, dc)| layout.cell(dr, dc).map(|cell| (dr, dc, cell)));
                let Some((design_row, design_col, cell)) = design else {
                    self.set_slot(row, col, MergeSlot::Standalone);
                    continue;
                };

                let mut target = cell.span.unwrap_or(SpanSize::ONE);
                if merge_cells && cell.merge_cells {
                    let down = if cell.merge_rows {
                        let chain = self.group_chain(cell, Axis::Rows);
                        self.vertical_run(row, col, design_row, &chain)
                    } else {
                        1
                    };
                    let across = if cell.merge_cols {
                        let chain = self.group_chain(cell, Axis::Cols);
                        self.horizontal_run(row, col, design_col, &chain)
                    } else {
                        1
                    };
                    target = target.max(SpanSize::new(down as i32, across as i32));
                }

                let size = self.claim(row, col, target);
                if size.is_degenerate() {
                    self.set_slot(row, col, MergeSlot::Standalone);
                    continue;
                }
                self.set_slot(row, col, MergeSlot::Anchor(size));
            }
        }

        let ncols = self.ncols;
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| match slot {
                MergeSlot::Anchor(size) => Some(Span::from_size(
                    span_coord(idx / ncols)?,
                    span_coord(idx % ncols)?,
                    *size,
                )),
                _ => None,
            })
            .collect()
    }
}

/// For each design row, the nearest page-after cell at or above it.
fn page_break_cells(view: CalcView<'_>) -> Vec<Option<(usize, usize)>> {
    let layout = view.layout;
    let mut nearest = None;
    (0..layout.row_count())
        .map(|r| {
            if let Some(c) = (0..layout.col_count())
                .find(|&c| layout.cell(r, c).is_some_and(|cell| cell.page_after))
            {
                nearest = Some((r, c));
            }
            nearest
        })
        .collect()
}

fn page_breaks(view: CalcView<'_>, data: &dyn TableSource) -> Vec<bool> {
    let nrows = view.rows.len();
    let mut breaks = vec![false; nrows];
    let by_design_row = page_break_cells(view);

    for row in 0..nrows.saturating_sub(1) {
        if !data.more_rows(row + 1) {
            break;
        }
        let Some(design_row) = view.rows.get(row) else {
            continue;
        };
        let Some(&Some((br, bc))) = by_design_row.get(design_row) else {
            continue;
        };
        let Some(cell) = view.layout.cell(br, bc) else {
            continue;
        };
        breaks[row] = match (cell.group, cell.name()) {
            (true, Some(name)) => {
                let this = view.rows.cell_context(row).and_then(|c| c.group(name));
                let next = view.rows.cell_context(row + 1).and_then(|c| c.group(name));
                this != next
            }
            _ => view
                .cols
                .get_reverse(bc)
                .is_some_and(|col| data.object(row, col) != data.object(row + 1, col)),
        };
    }
    breaks
}

/// Run both passes as configured.
pub(crate) fn post_process(
    view: CalcView<'_>,
    data: &dyn TableSource,
    arena: &ValueListArena,
    config: &LensConfig,
) -> PostProcessSummary {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!(
        "post_process",
        rows = view.rows.len(),
        cols = view.cols.len()
    )
    .entered();

    let spans = MergePass::new(view, data, arena).run(config.merge_cells);
    let page_breaks = if config.page_breaks {
        page_breaks(view, data)
    } else {
        vec![false; view.rows.len()]
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        spans = spans.len(),
        page_breaks = page_breaks.iter().filter(|b| **b).count(),
        "post_process complete"
    );
    PostProcessSummary { spans, page_breaks }
}
