use crate::calc::MergePrecedence;
use crate::span::DEFAULT_CHUNK;

/// Tuning knobs shared by the span index, the region store and the calc
/// runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensConfig {
    /// Container slots reserved each time a `SpanMap` backing array fills.
    pub span_chunk: usize,
    /// Candidates tried by `IndexMap::get_reverse_non_empty` before falling
    /// back to the first match.
    pub reverse_candidates: usize,
    /// Run the merge pass in `RuntimeCalcTable::post_process`.
    pub merge_cells: bool,
    /// Run page-break detection in `RuntimeCalcTable::post_process`.
    pub page_breaks: bool,
    /// Which side wins when row and column contexts name the same group.
    pub context_precedence: MergePrecedence,
    /// Intern identical cell attribute records when completing a region.
    pub intern_cell_info: bool,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            span_chunk: DEFAULT_CHUNK,
            reverse_candidates: 3,
            merge_cells: true,
            page_breaks: true,
            context_precedence: MergePrecedence::Second,
            intern_cell_info: true,
        }
    }
}
