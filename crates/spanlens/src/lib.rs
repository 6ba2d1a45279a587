pub mod calc;
pub mod config;
pub mod helpers;
pub mod interval_tree;
pub mod memory;
pub mod region;
pub mod span;
pub mod traits;

pub use calc::{
    CalcCellContext, CalcCellMap, CalcTableLayout, DesignCell, Expansion, Group, GroupValue,
    IndexMap, MergePrecedence, RuntimeCalcTable, ValueListArena, ValueListId,
};
pub use config::LensConfig;
pub use helpers::{CellHelper, RegionBounds, SpanHelper, ValidateHelper};
pub use memory::MemoryTable;
pub use region::{CellInfoInterner, Region, RegionTableLens, TableCellInfo};
pub use span::{Span, SpanMap, SpanMapBuilder};
pub use traits::TableSource;

pub use spanlens_common::{CellPoint, CellRect, CellValue, LensError, Lookup, SpanSize};

#[cfg(test)]
mod tests;
