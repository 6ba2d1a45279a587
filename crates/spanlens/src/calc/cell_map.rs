use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use spanlens_common::CellPoint;

use super::context::{CalcCellContext, MergePrecedence};
use super::index_map::IndexMap;
use super::layout::CalcTableLayout;

/// Borrowed view over the pieces that define a runtime calc table's shape.
#[derive(Debug, Clone, Copy)]
pub struct CalcView<'a> {
    pub layout: &'a CalcTableLayout,
    pub rows: &'a IndexMap,
    pub cols: &'a IndexMap,
    pub precedence: MergePrecedence,
}

impl<'a> CalcView<'a> {
    pub fn cell_name(&self, row: usize, col: usize) -> Option<&'a str> {
        self.layout
            .cell_name(self.rows.get(row)?, self.cols.get(col)?)
    }

    /// Row context merged with column context. `None` when neither side
    /// carries one.
    pub fn cell_context(&self, row: usize, col: usize) -> Option<CalcCellContext> {
        match (self.rows.cell_context(row), self.cols.cell_context(col)) {
            (Some(r), Some(c)) => Some(CalcCellContext::merge_with(r, c, self.precedence)),
            (Some(r), None) => Some(r.clone()),
            (None, Some(c)) => Some(c.clone()),
            (None, None) => None,
        }
    }
}

/// Name to runtime locations, built once from a [`CalcView`].
#[derive(Debug, Default)]
struct NameIndex {
    locations: FxHashMap<Arc<str>, Vec<CellPoint>>,
}

/// Lazily built cell-name index for a runtime calc table.
///
/// The first reader builds it; concurrent readers wait on that build and
/// then read without locking. [`CalcCellMap::reset`] drops it after the
/// runtime expansion changes.
#[derive(Debug, Default)]
pub struct CalcCellMap {
    index: OnceCell<NameIndex>,
}

impl CalcCellMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.index.get().is_some()
    }

    pub fn reset(&mut self) {
        self.index.take();
    }

    fn index(&self, view: CalcView<'_>) -> &NameIndex {
        self.index.get_or_init(|| {
            let mut locations: FxHashMap<Arc<str>, Vec<CellPoint>> = FxHashMap::default();
            for (row, design_row) in view.rows.iter().map(|(d, _)| d).enumerate() {
                for (col, design_col) in view.cols.iter().map(|(d, _)| d).enumerate() {
                    if let Some(cell) = view.layout.cell(design_row, design_col)
                        && let Some(name) = &cell.name
                    {
                        locations
                            .entry(name.clone())
                            .or_default()
                            .push(CellPoint::new(row, col));
                    }
                }
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(names = locations.len(), "calc cell map built");
            NameIndex { locations }
        })
    }

    /// Runtime locations of cell `name` in row-major order.
    pub fn locations(&self, view: CalcView<'_>, name: &str) -> &[CellPoint] {
        self.index(view)
            .locations
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn cell_name<'a>(&self, view: CalcView<'a>, row: usize, col: usize) -> Option<&'a str> {
        view.cell_name(row, col)
    }

    /// The location of `name` produced by the same expansion as `context`:
    /// every group both contexts name must agree. A location with no
    /// context matches anything.
    pub fn location_in_context(
        &self,
        view: CalcView<'_>,
        name: &str,
        context: &CalcCellContext,
    ) -> Option<CellPoint> {
        self.locations(view, name).iter().copied().find(|p| {
            view.cell_context(p.row, p.col).is_none_or(|own| {
                own.groups()
                    .all(|g| context.group(g.name()).is_none_or(|other| other == g))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::{DesignCell, Expansion, ValueListArena};

    fn fixture() -> (CalcTableLayout, IndexMap, IndexMap) {
        let mut layout = CalcTableLayout::new(2, 2);
        layout.set_cell(0, 0, DesignCell::group("region", Expansion::Vertical));
        layout.set_cell(0, 1, DesignCell::named("sales").with_row_group("region"));
        layout.set_cell(1, 1, DesignCell::named("total"));

        let mut arena = ValueListArena::new();
        let regions = arena.alloc_scalars(["North", "South", "West"]);
        let mut rows = IndexMap::new();
        for pos in 0..3 {
            rows.push(0, Some(CalcCellContext::new().with_group("region", pos, regions)));
        }
        rows.push(1, None);
        (layout, rows, IndexMap::identity(2))
    }

    #[test]
    fn builds_once_and_resets() {
        let (layout, rows, cols) = fixture();
        let view = CalcView {
            layout: &layout,
            rows: &rows,
            cols: &cols,
            precedence: MergePrecedence::Second,
        };
        let mut map = CalcCellMap::new();
        assert!(!map.is_built());
        assert_eq!(
            map.locations(view, "sales"),
            &[CellPoint::new(0, 1), CellPoint::new(1, 1), CellPoint::new(2, 1)]
        );
        assert_eq!(map.locations(view, "total"), &[CellPoint::new(3, 1)]);
        assert!(map.locations(view, "missing").is_empty());
        assert!(map.is_built());
        assert_eq!(map.cell_name(view, 2, 0), Some("region"));
        assert_eq!(map.cell_name(view, 3, 0), None);

        map.reset();
        assert!(!map.is_built());
    }

    #[test]
    fn location_follows_context() {
        let (layout, rows, cols) = fixture();
        let view = CalcView {
            layout: &layout,
            rows: &rows,
            cols: &cols,
            precedence: MergePrecedence::Second,
        };
        let map = CalcCellMap::new();
        let ctx = view.cell_context(1, 0).unwrap();
        assert_eq!(
            map.location_in_context(view, "sales", &ctx),
            Some(CellPoint::new(1, 1))
        );
        assert_eq!(
            map.location_in_context(view, "total", &ctx),
            Some(CellPoint::new(3, 1))
        );
    }
}
