use std::sync::Arc;

use spanlens_common::{CellRect, CellValue};

use super::common::{merged_region, region_table, text};
use crate::calc::{
    CalcCellContext, CalcTableLayout, DesignCell, Expansion, IndexMap, MergePrecedence,
    RuntimeCalcTable, ValueListArena,
};
use crate::config::LensConfig;
use crate::memory::MemoryTable;
use crate::span::Span;
use crate::traits::TableSource;

#[test]
fn north_rows_merge_into_one_span() {
    let mut table = region_table(merged_region(), LensConfig::default());
    let summary = table.post_process();

    assert_eq!(summary.spans, vec![Span::new(1, 0, 3, 1)]);
    assert_eq!(table.span(1, 0), Some(CellRect::new(0, 0, 1, 3)));
    assert_eq!(table.span(2, 0), Some(CellRect::new(0, -1, 1, 3)));
    assert_eq!(table.span(3, 0), Some(CellRect::new(0, -2, 1, 3)));
    assert_eq!(table.span(4, 0), None);
    assert_eq!(table.span(2, 1), None);
}

#[test]
fn post_process_is_idempotent() {
    let mut table = region_table(merged_region(), LensConfig::default());
    let first = table.post_process();
    let second = table.post_process();
    assert_eq!(first, second);
    assert_eq!(table.span_map().span_count(), 1);
}

#[test]
fn merge_can_be_switched_off() {
    let config = LensConfig {
        merge_cells: false,
        ..LensConfig::default()
    };
    let mut table = region_table(merged_region(), config);
    assert!(table.post_process().spans.is_empty());
}

#[test]
fn vertical_only_cells_do_not_grow_sideways() {
    let cell = DesignCell::group("region", Expansion::Vertical).merge_directions(true, false);
    let mut table = region_table(cell, LensConfig::default());
    assert_eq!(table.post_process().spans, vec![Span::new(1, 0, 3, 1)]);
}

/// country > region > amount, four runtime rows:
/// (US, East) (US, East) (CA, East) (CA, West)
fn nested_table() -> RuntimeCalcTable {
    let mut layout = CalcTableLayout::new(1, 3);
    layout.set_cell(0, 0, DesignCell::group("country", Expansion::Vertical).merged());
    layout.set_cell(
        0,
        1,
        DesignCell::group("region", Expansion::Vertical)
            .merged()
            .with_row_group("country"),
    );
    layout.set_cell(0, 2, DesignCell::named("amount").with_row_group("region"));

    let mut arena = ValueListArena::new();
    let countries = arena.alloc_scalars(["US", "CA"]);
    let regions = arena.alloc_scalars(["East", "West"]);
    let mut rows = IndexMap::new();
    for (country, region) in [(0, 0), (0, 0), (1, 0), (1, 1)] {
        rows.push(
            0,
            Some(
                CalcCellContext::new()
                    .with_group("country", country, countries)
                    .with_group("region", region, regions),
            ),
        );
    }
    let data = MemoryTable::from_rows(vec![
        vec![text("US"), text("East"), CellValue::Int(1)],
        vec![text("US"), text("East"), CellValue::Int(2)],
        vec![text("CA"), text("East"), CellValue::Int(3)],
        vec![text("CA"), text("West"), CellValue::Int(4)],
    ]);
    RuntimeCalcTable::new(
        Arc::new(layout),
        Arc::new(arena),
        rows,
        IndexMap::identity(3),
        data,
    )
}

#[test]
fn enclosing_group_change_stops_the_run() {
    let mut table = nested_table();
    let spans = table.post_process().spans;
    assert_eq!(
        spans,
        vec![
            Span::new(0, 0, 2, 1),
            Span::new(0, 1, 2, 1),
            Span::new(2, 0, 2, 1),
        ]
    );
    assert_eq!(table.span(2, 1), None);
}

#[test]
fn dangling_parent_falls_back_to_value_equality() {
    let mut layout = CalcTableLayout::new(1, 1);
    layout.set_cell(
        0,
        0,
        DesignCell::named("amount").merged().with_row_group("ghost"),
    );
    let data = MemoryTable::from_rows(vec![vec![5], vec![5], vec![6]]);
    let mut table = RuntimeCalcTable::new(
        Arc::new(layout),
        Arc::new(ValueListArena::new()),
        [0, 0, 0].into_iter().map(|d| (d, None)).collect(),
        IndexMap::identity(1),
        data,
    );
    assert_eq!(table.post_process().spans, vec![Span::new(0, 0, 2, 1)]);
}

#[test]
fn crosstab_header_merges_across_columns() {
    let mut layout = CalcTableLayout::new(2, 2);
    layout.set_cell(0, 1, DesignCell::group("year", Expansion::Horizontal).merged());
    layout.set_cell(1, 1, DesignCell::named("sales").with_col_group("year"));

    let mut arena = ValueListArena::new();
    let years = arena.alloc_scalars([2023, 2024]);
    let mut cols = IndexMap::new();
    cols.push(0, None);
    for pos in [0, 0, 1] {
        cols.push(1, Some(CalcCellContext::new().with_group("year", pos, years)));
    }
    let data = MemoryTable::from_rows(vec![
        vec![text(""), CellValue::Int(2023), CellValue::Int(2023), CellValue::Int(2024)],
        vec![text("Sales"), CellValue::Int(1), CellValue::Int(2), CellValue::Int(3)],
    ]);
    let mut table = RuntimeCalcTable::new(
        Arc::new(layout),
        Arc::new(arena),
        IndexMap::identity(2),
        cols,
        data,
    );

    assert_eq!(table.post_process().spans, vec![Span::new(0, 1, 1, 2)]);
    assert_eq!(table.span(0, 2), Some(CellRect::new(-1, 0, 2, 1)));
    assert_eq!(table.span(0, 3), None);
}

#[test]
fn design_span_wins_when_larger() {
    let mut layout = CalcTableLayout::new(1, 2);
    layout.set_cell(0, 0, DesignCell::named("label").merged().with_span(1, 2));
    let data = MemoryTable::from_rows(vec![vec![text("a"), text("b")], vec![text("a"), text("c")]]);
    let mut table = RuntimeCalcTable::new(
        Arc::new(layout),
        Arc::new(ValueListArena::new()),
        [0, 0].into_iter().map(|d| (d, None)).collect(),
        IndexMap::identity(2),
        data,
    );
    assert_eq!(table.post_process().spans, vec![Span::new(0, 0, 2, 2)]);
}

#[test]
fn cell_context_precedence_is_configurable() {
    let mut layout = CalcTableLayout::new(1, 1);
    layout.set_cell(0, 0, DesignCell::named("cell"));
    let mut arena = ValueListArena::new();
    let regions = arena.alloc_scalars(["North", "South"]);
    let row_ctx = CalcCellContext::new().with_group("region", 0, regions);
    let col_ctx = CalcCellContext::new().with_group("region", 1, regions);

    let build = |precedence| {
        let mut rows = IndexMap::new();
        rows.push(0, Some(row_ctx.clone()));
        let mut cols = IndexMap::new();
        cols.push(0, Some(col_ctx.clone()));
        RuntimeCalcTable::with_config(
            Arc::new(layout.clone()),
            Arc::new(arena.clone()),
            rows,
            cols,
            MemoryTable::new(1, 1),
            LensConfig {
                context_precedence: precedence,
                ..LensConfig::default()
            },
        )
    };

    let second = build(MergePrecedence::Second);
    let ctx = second.cell_context(0, 0).unwrap();
    assert_eq!(ctx.group("region"), col_ctx.group("region"));

    let first = build(MergePrecedence::First);
    let ctx = first.cell_context(0, 0).unwrap();
    assert_eq!(ctx.group("region"), row_ctx.group("region"));
}
