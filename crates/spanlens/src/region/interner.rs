use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::cell_info::TableCellInfo;

/// Deduplicates [`TableCellInfo`] records for one render pass.
///
/// Lenses hand their records over in `complete`; identical records come back
/// as one shared `Arc`. Drop the interner with the pass.
#[derive(Debug, Default)]
pub struct CellInfoInterner {
    records: FxHashSet<Arc<TableCellInfo>>,
    hits: usize,
}

impl CellInfoInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared record equal to `info`, inserting `info` if it is new.
    pub fn intern(&mut self, info: &Arc<TableCellInfo>) -> Arc<TableCellInfo> {
        if let Some(existing) = self.records.get(info.as_ref()) {
            self.hits += 1;
            return Arc::clone(existing);
        }
        self.records.insert(Arc::clone(info));
        Arc::clone(info)
    }

    /// Distinct records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lookups answered with an existing record.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.hits = 0;
    }
}
