use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use spanlens_common::{LensError, Result};

use super::context::CalcCellContext;
use super::value_list::ValueListArena;

type ReverseIndex = FxHashMap<usize, SmallVec<[usize; 4]>>;

#[derive(Debug, Clone, PartialEq)]
struct IndexEntry {
    design: usize,
    context: Option<Arc<CalcCellContext>>,
}

/// Runtime row (or column) index to design index, plus the group context
/// that produced each runtime position.
///
/// The reverse direction is built on first use and dropped on every
/// mutation.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    entries: Vec<IndexEntry>,
    reverse: OnceCell<ReverseIndex>,
}

impl IndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` runtime positions mapping one-to-one onto design positions.
    pub fn identity(n: usize) -> Self {
        Self {
            entries: (0..n)
                .map(|design| IndexEntry {
                    design,
                    context: None,
                })
                .collect(),
            reverse: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, design: usize, context: Option<CalcCellContext>) {
        self.push_shared(design, context.map(Arc::new));
    }

    /// Append with a context shared by other runtime positions.
    pub fn push_shared(&mut self, design: usize, context: Option<Arc<CalcCellContext>>) {
        self.entries.push(IndexEntry { design, context });
        self.reverse.take();
    }

    /// Design index of runtime position `index`.
    pub fn get(&self, index: usize) -> Option<usize> {
        self.entries.get(index).map(|e| e.design)
    }

    pub fn cell_context(&self, index: usize) -> Option<&CalcCellContext> {
        self.entries.get(index)?.context.as_deref()
    }

    pub fn shared_context(&self, index: usize) -> Option<&Arc<CalcCellContext>> {
        self.entries.get(index)?.context.as_ref()
    }

    fn reverse(&self) -> &ReverseIndex {
        self.reverse.get_or_init(|| {
            let mut reverse = ReverseIndex::default();
            for (runtime, entry) in self.entries.iter().enumerate() {
                reverse.entry(entry.design).or_default().push(runtime);
            }
            reverse
        })
    }

    /// Every runtime position expanded from `design`, ascending.
    pub fn get_reverse_indexes(&self, design: usize) -> &[usize] {
        self.reverse()
            .get(&design)
            .map(SmallVec::as_slice)
            .unwrap_or(&[])
    }

    /// First runtime position expanded from `design`.
    pub fn get_reverse(&self, design: usize) -> Option<usize> {
        self.get_reverse_indexes(design).first().copied()
    }

    /// Among the first `candidates` runtime positions for `design`, the first
    /// whose context has a non-empty value for every group. Falls back to
    /// [`IndexMap::get_reverse`] when none qualifies.
    pub fn get_reverse_non_empty(
        &self,
        design: usize,
        arena: &ValueListArena,
        candidates: usize,
    ) -> Option<usize> {
        let indexes = self.get_reverse_indexes(design);
        indexes
            .iter()
            .take(candidates)
            .copied()
            .find(|&i| self.cell_context(i).is_none_or(|ctx| ctx.has_values(arena)))
            .or_else(|| indexes.first().copied())
    }

    /// Insert at runtime position `at` (clamped to the end); later positions
    /// shift down by one.
    pub fn insert(&mut self, at: usize, design: usize, context: Option<Arc<CalcCellContext>>) {
        let at = at.min(self.entries.len());
        self.entries.insert(at, IndexEntry { design, context });
        self.reverse.take();
    }

    pub fn try_insert(
        &mut self,
        at: usize,
        design: usize,
        context: Option<Arc<CalcCellContext>>,
    ) -> Result<()> {
        if at > self.entries.len() {
            return Err(LensError::IndexOutOfRange {
                index: at,
                len: self.entries.len(),
            });
        }
        self.insert(at, design, context);
        Ok(())
    }

    /// Remove runtime position `at`, returning its design index and context.
    pub fn remove(&mut self, at: usize) -> Option<(usize, Option<Arc<CalcCellContext>>)> {
        if at >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(at);
        self.reverse.take();
        Some((entry.design, entry.context))
    }

    pub fn try_remove(&mut self, at: usize) -> Result<(usize, Option<Arc<CalcCellContext>>)> {
        let len = self.entries.len();
        self.remove(at)
            .ok_or(LensError::IndexOutOfRange { index: at, len })
    }

    /// `(design, context)` per runtime position.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&CalcCellContext>)> + '_ {
        self.entries.iter().map(|e| (e.design, e.context.as_deref()))
    }
}

impl FromIterator<(usize, Option<CalcCellContext>)> for IndexMap {
    fn from_iter<I: IntoIterator<Item = (usize, Option<CalcCellContext>)>>(iter: I) -> Self {
        let mut map = IndexMap::new();
        for (design, context) in iter {
            map.push(design, context);
        }
        map
    }
}
