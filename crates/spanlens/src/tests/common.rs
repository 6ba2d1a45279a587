//! Shared calc-table fixtures.
use std::sync::Arc;

use spanlens_common::CellValue;

use crate::calc::{
    CalcCellContext, CalcTableLayout, DesignCell, Expansion, IndexMap, RuntimeCalcTable,
    ValueListArena,
};
use crate::config::LensConfig;
use crate::memory::MemoryTable;

pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

/// Header row plus one `region` group row expanded over `regions`, with an
/// `amount` detail cell beside it:
///
/// ```text
/// 0  Region | Amount
/// 1  North  | 10
/// 2  North  | 20
/// 3  North  | 30
/// 4  South  | 40
/// ```
pub fn region_table(region: DesignCell, config: LensConfig) -> RuntimeCalcTable {
    let mut layout = CalcTableLayout::new(2, 2).with_headers(1, 0);
    layout.set_cell(0, 0, DesignCell::named("region_header"));
    layout.set_cell(0, 1, DesignCell::named("amount_header"));
    layout.set_cell(1, 0, region);
    layout.set_cell(1, 1, DesignCell::named("amount").with_row_group("region"));

    let mut arena = ValueListArena::new();
    let regions = arena.alloc_scalars(["North", "South"]);
    let mut rows = IndexMap::new();
    rows.push(0, None);
    for pos in [0, 0, 0, 1] {
        rows.push(1, Some(CalcCellContext::new().with_group("region", pos, regions)));
    }

    let data = MemoryTable::from_rows(vec![
        vec![text("Region"), text("Amount")],
        vec![text("North"), CellValue::Int(10)],
        vec![text("North"), CellValue::Int(20)],
        vec![text("North"), CellValue::Int(30)],
        vec![text("South"), CellValue::Int(40)],
    ]);
    RuntimeCalcTable::with_config(
        Arc::new(layout),
        Arc::new(arena),
        rows,
        IndexMap::identity(2),
        data,
        config,
    )
}

pub fn merged_region() -> DesignCell {
    DesignCell::group("region", Expansion::Vertical).merged()
}
