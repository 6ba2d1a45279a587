#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Three-state lookup result.
///
/// Attribute caches need to tell "looked up, nothing there" apart from
/// "never looked up", and both apart from a real value. A bare `Option`
/// collapses the first two.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lookup<T> {
    /// Not resolved yet.
    #[default]
    NotComputed,
    /// Resolved; no value exists.
    Absent,
    /// Resolved to a value.
    Present(T),
}

impl<T> Lookup<T> {
    pub fn is_computed(&self) -> bool {
        !matches!(self, Lookup::NotComputed)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }

    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Lookup::NotComputed => Lookup::NotComputed,
            Lookup::Absent => Lookup::Absent,
            Lookup::Present(v) => Lookup::Present(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::NotComputed => Lookup::NotComputed,
            Lookup::Absent => Lookup::Absent,
            Lookup::Present(v) => Lookup::Present(f(v)),
        }
    }

    /// Collapse to `Option`, treating "not computed" as absent.
    pub fn present(self) -> Option<T> {
        match self {
            Lookup::Present(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Present(v),
            None => Lookup::Absent,
        }
    }
}
