use spanlens_common::{CellValue, IntoCellValue};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle to a value list owned by a [`ValueListArena`].
///
/// Two groups refer to the same expansion pass exactly when their ids match;
/// the values themselves are never compared for identity.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueListId(u32);

impl ValueListId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One position in a group's value list.
///
/// `Tuple` holds a composite row shared by several groups expanding over the
/// same row set; each group picks its slot through the context's value index.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupValue {
    Scalar(CellValue),
    Tuple(Vec<CellValue>),
}

impl GroupValue {
    /// Resolve to a single value; `slot` only matters for tuples.
    pub fn resolve(&self, slot: usize) -> Option<&CellValue> {
        match self {
            GroupValue::Scalar(v) => Some(v),
            GroupValue::Tuple(values) => values.get(slot),
        }
    }
}

impl From<CellValue> for GroupValue {
    fn from(value: CellValue) -> Self {
        GroupValue::Scalar(value)
    }
}

/// Owner of every group value list produced during one expansion.
#[derive(Debug, Clone, Default)]
pub struct ValueListArena {
    lists: Vec<Vec<GroupValue>>,
}

impl ValueListArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, values: Vec<GroupValue>) -> ValueListId {
        let id = ValueListId(self.lists.len() as u32);
        self.lists.push(values);
        id
    }

    pub fn alloc_scalars<I, V>(&mut self, values: I) -> ValueListId
    where
        I: IntoIterator<Item = V>,
        V: IntoCellValue,
    {
        self.alloc(
            values
                .into_iter()
                .map(|v| GroupValue::Scalar(v.into_cell_value()))
                .collect(),
        )
    }

    pub fn get(&self, id: ValueListId) -> Option<&[GroupValue]> {
        self.lists.get(id.index()).map(Vec::as_slice)
    }

    pub fn value(&self, id: ValueListId, position: usize) -> Option<&GroupValue> {
        self.lists.get(id.index())?.get(position)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_identity_not_content() {
        let mut arena = ValueListArena::new();
        let a = arena.alloc_scalars(["x", "y"]);
        let b = arena.alloc_scalars(["x", "y"]);
        assert_ne!(a, b);
        assert_eq!(arena.get(a), arena.get(b));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn tuple_slots() {
        let mut arena = ValueListArena::new();
        let id = arena.alloc(vec![GroupValue::Tuple(vec![
            CellValue::Text("east".into()),
            CellValue::Int(4),
        ])]);
        let value = arena.value(id, 0).unwrap();
        assert_eq!(value.resolve(1), Some(&CellValue::Int(4)));
        assert_eq!(value.resolve(2), None);
        assert_eq!(arena.value(id, 1), None);
    }
}
