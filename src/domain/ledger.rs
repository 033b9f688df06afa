use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::entities::row::{RowData, RowIndex};

/// Baseline copy of every row plus the rows that currently differ from it.
///
/// Both maps hold owned copies, so later writes to the host table never
/// reach into the ledger.
#[derive(Debug, Clone)]
pub struct DirtyLedger {
    baseline: BTreeMap<RowIndex, RowData>,
    dirty: BTreeMap<RowIndex, RowData>,
    captured_at: DateTime<Utc>,
}

impl Default for DirtyLedger {
    fn default() -> Self {
        Self {
            baseline: BTreeMap::new(),
            dirty: BTreeMap::new(),
            captured_at: Utc::now(),
        }
    }
}

impl DirtyLedger {
    pub fn new(rows: BTreeMap<RowIndex, RowData>) -> Self {
        let mut ledger = Self::default();
        ledger.snapshot(rows);
        ledger
    }

    /// Replaces the baseline; every row now matches it, so nothing is dirty.
    pub fn snapshot(&mut self, rows: BTreeMap<RowIndex, RowData>) {
        self.baseline = rows;
        self.dirty.clear();
        self.captured_at = Utc::now();
    }

    /// Reclassifies one row against its own baseline entry. `current` is
    /// `None` when the row is no longer in the host table. Returns whether
    /// the row is dirty afterwards.
    pub fn reconcile(&mut self, index: RowIndex, current: Option<&RowData>) -> bool {
        let baseline = self.baseline.get(&index);
        match current {
            Some(data) if baseline != Some(data) => {
                self.dirty.insert(index, data.clone());
                true
            }
            _ => {
                self.dirty.remove(&index);
                false
            }
        }
    }

    pub fn forget(&mut self, index: RowIndex) -> Option<RowData> {
        self.dirty.remove(&index)
    }

    /// Clears the dirty set and hands back the rows to restore.
    pub fn rollback(&mut self) -> BTreeMap<RowIndex, RowData> {
        self.dirty.clear();
        self.baseline.clone()
    }

    pub fn dirty_rows(&self) -> &BTreeMap<RowIndex, RowData> {
        &self.dirty
    }

    pub fn is_dirty(&self, index: RowIndex) -> bool {
        self.dirty.contains_key(&index)
    }

    pub fn baseline(&self, index: RowIndex) -> Option<&RowData> {
        self.baseline.get(&index)
    }

    pub fn baseline_len(&self) -> usize {
        self.baseline.len()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(value: Value) -> RowData {
        value.as_object().cloned().expect("fixture should be an object")
    }

    fn ledger_with(rows: Vec<(usize, Value)>) -> DirtyLedger {
        DirtyLedger::new(
            rows.into_iter()
                .map(|(idx, value)| (RowIndex(idx), row(value)))
                .collect(),
        )
    }

    #[test]
    fn reconcile_tracks_divergence_and_return_to_baseline() {
        let mut ledger = ledger_with(vec![(0, json!({"status": 0, "val": "a"}))]);

        let changed = row(json!({"status": 0, "val": "b"}));
        assert!(ledger.reconcile(RowIndex(0), Some(&changed)));
        assert_eq!(ledger.dirty_rows().get(&RowIndex(0)), Some(&changed));

        let restored = row(json!({"status": 0, "val": "a"}));
        assert!(!ledger.reconcile(RowIndex(0), Some(&restored)));
        assert!(ledger.dirty_rows().is_empty());
    }

    #[test]
    fn equality_is_structural_not_positional() {
        let mut ledger = ledger_with(vec![
            (0, json!({"val": "a", "tags": [1, 2]})),
            (1, json!({"val": "b"})),
        ]);

        // Same values as row 0 but stored at row 1: still dirty for row 1.
        let copy_of_zero = row(json!({"tags": [1, 2], "val": "a"}));
        assert!(!ledger.reconcile(RowIndex(0), Some(&copy_of_zero)));
        assert!(ledger.reconcile(RowIndex(1), Some(&copy_of_zero)));
    }

    #[test]
    fn rows_without_baseline_are_dirty_until_gone() {
        let mut ledger = ledger_with(vec![]);
        let added = row(json!({"val": "new"}));

        assert!(ledger.reconcile(RowIndex(5), Some(&added)));
        assert!(!ledger.reconcile(RowIndex(5), None));
        assert!(!ledger.is_dirty(RowIndex(5)));
    }

    #[test]
    fn rollback_clears_dirty_and_returns_baseline() {
        let mut ledger = ledger_with(vec![(0, json!({"val": "a"})), (1, json!({"val": "b"}))]);
        ledger.reconcile(RowIndex(1), Some(&row(json!({"val": "z"}))));

        let restored = ledger.rollback();

        assert!(ledger.dirty_rows().is_empty());
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(&RowIndex(1)), Some(&row(json!({"val": "b"}))));
    }

    #[test]
    fn snapshot_resets_dirty_set() {
        let mut ledger = ledger_with(vec![(0, json!({"val": "a"}))]);
        let changed = row(json!({"val": "b"}));
        ledger.reconcile(RowIndex(0), Some(&changed));

        ledger.snapshot(BTreeMap::from([(RowIndex(0), changed.clone())]));

        assert!(ledger.dirty_rows().is_empty());
        assert_eq!(ledger.baseline(RowIndex(0)), Some(&changed));
    }
}
