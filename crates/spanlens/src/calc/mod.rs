//! Calc (freehand) table runtime: group contexts, runtime-to-design index
//! maps, and the post-process pass that turns repeated group values into
//! merged spans.

mod cell_map;
mod context;
mod index_map;
mod layout;
mod post_process;
mod runtime;
mod value_list;

pub use cell_map::{CalcCellMap, CalcView};
pub use context::{CalcCellContext, Group, MergePrecedence};
pub use index_map::IndexMap;
pub use layout::{CalcTableLayout, DesignCell, Expansion};
pub use post_process::PostProcessSummary;
pub use runtime::RuntimeCalcTable;
pub use value_list::{GroupValue, ValueListArena, ValueListId};
