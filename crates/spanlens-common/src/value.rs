use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A value held by a table cell or produced by a group expansion.
///
/// `Empty` is the "present but null" case; a cell that does not exist at
/// all is reported by the caller as `None`/[`crate::Lookup::Absent`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Int(i64),
    Number(f64),
    Text(String),
    Boolean(bool),
}

/// Bit pattern used for both equality and hashing: `-0.0` folds onto `0.0`
/// and every NaN onto one canonical NaN.
#[inline]
fn number_key(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0
    } else {
        n.to_bits()
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => true,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Number(a), CellValue::Number(b)) => number_key(*a) == number_key(*b),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            CellValue::Empty => {}
            CellValue::Int(i) => i.hash(state),
            CellValue::Number(n) => number_key(*n).hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Boolean(b) => b.hash(state),
        }
    }
}

impl Eq for CellValue {}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// Local conversion trait so tests and callers can pass primitives directly
pub trait IntoCellValue {
    fn into_cell_value(self) -> CellValue;
}

impl IntoCellValue for CellValue {
    fn into_cell_value(self) -> CellValue {
        self
    }
}

impl IntoCellValue for f64 {
    fn into_cell_value(self) -> CellValue {
        CellValue::Number(self)
    }
}

impl IntoCellValue for i64 {
    fn into_cell_value(self) -> CellValue {
        CellValue::Int(self)
    }
}

impl IntoCellValue for i32 {
    fn into_cell_value(self) -> CellValue {
        CellValue::Int(self as i64)
    }
}

impl IntoCellValue for bool {
    fn into_cell_value(self) -> CellValue {
        CellValue::Boolean(self)
    }
}

impl IntoCellValue for String {
    fn into_cell_value(self) -> CellValue {
        CellValue::Text(self)
    }
}

impl IntoCellValue for &str {
    fn into_cell_value(self) -> CellValue {
        CellValue::Text(self.to_string())
    }
}

impl<T: IntoCellValue> IntoCellValue for Option<T> {
    fn into_cell_value(self) -> CellValue {
        self.map(IntoCellValue::into_cell_value).unwrap_or_default()
    }
}
