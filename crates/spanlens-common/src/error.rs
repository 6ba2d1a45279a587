//! Errors raised by the *checked* construction paths.
//!
//! Query paths never fail: a missing span, an unknown cell name or an
//! out-of-range coordinate comes back as `None` / [`crate::Lookup::Absent`]
//! and the dependent feature (span, merge, page break) is simply not applied.
//! `LensError` is reserved for builders and `try_*` mutators where the caller
//! asked to be told about contract violations.

/// Contract violations detected by checked span/index construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LensError {
    /// `SpanMap::try_add` received a span anchored before the previous one.
    #[error("span at ({row}, {col}) added after span at ({last_row}, {last_col})")]
    SpanOutOfOrder {
        row: i32,
        col: i32,
        last_row: i32,
        last_col: i32,
    },

    /// Two spans cover at least one common cell.
    #[error("span at ({row}, {col}) overlaps span anchored at ({other_row}, {other_col})")]
    SpanOverlap {
        row: i32,
        col: i32,
        other_row: i32,
        other_col: i32,
    },

    /// Negative anchor or non-positive extent.
    #[error("invalid span ({rows}x{cols}) at ({row}, {col})")]
    InvalidSpan {
        row: i32,
        col: i32,
        rows: i32,
        cols: i32,
    },

    /// Span leaves the table.
    #[error("span at ({row}, {col}) extends past the table bounds")]
    OutOfBounds { row: i32, col: i32 },

    /// Span crosses a header/body/trailer boundary.
    #[error("span at ({row}, {col}) crosses a region boundary")]
    RegionBoundary { row: i32, col: i32 },

    /// Named cell not present in the design.
    #[error("unknown cell name: {0}")]
    UnknownCell(String),

    /// Index outside `0..=len` for insert or `0..len` for remove.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Convenience alias used throughout the crates.
pub type Result<T> = std::result::Result<T, LensError>;
