use std::sync::Arc;

use rustc_hash::FxHashMap;
use spanlens_common::CellValue;

use super::value_list::{ValueListArena, ValueListId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side wins when two contexts carry the same group name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MergePrecedence {
    First,
    #[default]
    Second,
}

/// One group iteration: group `name` at `position` within a value list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    name: Arc<str>,
    position: usize,
    values: ValueListId,
}

impl Group {
    pub fn new(name: impl Into<Arc<str>>, position: usize, values: ValueListId) -> Self {
        Self {
            name: name.into(),
            position,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn values(&self) -> ValueListId {
        self.values
    }

    /// The data value this iteration stands for. Tuple entries are indexed
    /// by `context`'s value index for this group (slot 0 when unset).
    pub fn value<'a>(
        &self,
        context: &CalcCellContext,
        arena: &'a ValueListArena,
    ) -> Option<&'a CellValue> {
        let slot = context.value_index(&self.name).unwrap_or(0);
        arena.value(self.values, self.position)?.resolve(slot)
    }
}

/// The set of group iterations that produced one runtime cell.
///
/// Equality compares the group maps only: name, position and value-list
/// identity. Value indexes ride along but do not take part.
#[derive(Debug, Clone, Default)]
pub struct CalcCellContext {
    groups: FxHashMap<Arc<str>, Group>,
    value_index: FxHashMap<Arc<str>, usize>,
}

impl PartialEq for CalcCellContext {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

impl Eq for CalcCellContext {}

impl CalcCellContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: impl Into<Arc<str>>, position: usize, values: ValueListId) {
        let group = Group::new(name, position, values);
        self.groups.insert(group.name.clone(), group);
    }

    /// Builder form of [`CalcCellContext::add_group`].
    pub fn with_group(
        mut self,
        name: impl Into<Arc<str>>,
        position: usize,
        values: ValueListId,
    ) -> Self {
        self.add_group(name, position, values);
        self
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn set_value_index(&mut self, name: impl Into<Arc<str>>, index: usize) {
        self.value_index.insert(name.into(), index);
    }

    pub fn value_index(&self, name: &str) -> Option<usize> {
        self.value_index.get(name).copied()
    }

    /// Value of group `name` in this context.
    pub fn group_value<'a>(&self, name: &str, arena: &'a ValueListArena) -> Option<&'a CellValue> {
        self.group(name)?.value(self, arena)
    }

    /// Canonical key: `name:position,` per group, sorted by name.
    pub fn identifier(&self) -> String {
        let mut groups: Vec<&Group> = self.groups.values().collect();
        groups.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        groups
            .iter()
            .map(|g| format!("{}:{},", g.name, g.position))
            .collect()
    }

    /// True when some group present in both contexts resolves to the same
    /// value in each.
    pub fn equals_one_group(&self, other: &CalcCellContext, arena: &ValueListArena) -> bool {
        self.groups.values().any(|g| {
            other.group(&g.name).is_some_and(|og| {
                let mine = g.value(self, arena);
                mine.is_some() && mine == og.value(other, arena)
            })
        })
    }

    /// Every group resolves to a non-empty value.
    pub fn has_values(&self, arena: &ValueListArena) -> bool {
        self.groups
            .values()
            .all(|g| g.value(self, arena).is_some_and(|v| !v.is_empty()))
    }

    /// Union of both contexts; `second` wins on a shared name.
    pub fn merge(first: &CalcCellContext, second: &CalcCellContext) -> CalcCellContext {
        Self::merge_with(first, second, MergePrecedence::Second)
    }

    pub fn merge_with(
        first: &CalcCellContext,
        second: &CalcCellContext,
        precedence: MergePrecedence,
    ) -> CalcCellContext {
        let (base, winner) = match precedence {
            MergePrecedence::First => (second, first),
            MergePrecedence::Second => (first, second),
        };
        let mut merged = base.clone();
        merged.groups.extend(
            winner
                .groups
                .iter()
                .map(|(k, g)| (k.clone(), g.clone())),
        );
        merged
            .value_index
            .extend(winner.value_index.iter().map(|(k, v)| (k.clone(), *v)));
        merged
    }
}
