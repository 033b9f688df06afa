use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::MIN_HOST_VERSION;
use crate::domain::entities::dataset::ColumnMeta;
use crate::domain::entities::row::{RowData, RowIndex, RowMarkers};
use crate::usecase::ports::host::{HostError, HostTable, HostVersion};

/// Host table kept entirely in memory, with an optional view window
/// standing in for paging and filtering.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    columns: Vec<ColumnMeta>,
    rows: BTreeMap<RowIndex, RowData>,
    markers: BTreeMap<RowIndex, RowMarkers>,
    window: Option<Vec<RowIndex>>,
    next_index: usize,
    version: HostVersion,
    draws: usize,
}

impl MemoryTable {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<RowData>) -> Self {
        let next_index = rows.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, data)| (RowIndex(idx), data))
            .collect();

        Self {
            columns,
            rows,
            markers: BTreeMap::new(),
            window: None,
            next_index,
            version: MIN_HOST_VERSION,
            draws: 0,
        }
    }

    pub fn with_version(mut self, version: HostVersion) -> Self {
        self.version = version;
        self
    }

    /// Limits `visible_rows` to the given rows; `None` shows everything.
    pub fn set_window(&mut self, window: Option<Vec<RowIndex>>) {
        self.window = window;
    }

    pub fn set_row_editable(&mut self, index: RowIndex, editable: Option<bool>) {
        self.markers.entry(index).or_default().editable = editable;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn draw_count(&self) -> usize {
        self.draws
    }
}

impl HostTable for MemoryTable {
    fn version(&self) -> HostVersion {
        self.version
    }

    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn row_indices(&self) -> Vec<RowIndex> {
        self.rows.keys().copied().collect()
    }

    fn visible_rows(&self) -> Vec<RowIndex> {
        match &self.window {
            Some(window) => window
                .iter()
                .copied()
                .filter(|index| self.rows.contains_key(index))
                .collect(),
            None => self.row_indices(),
        }
    }

    fn row(&self, index: RowIndex) -> Option<RowData> {
        self.rows.get(&index).cloned()
    }

    fn set_row(&mut self, index: RowIndex, data: RowData) -> Result<(), HostError> {
        let row = self
            .rows
            .get_mut(&index)
            .ok_or(HostError::MissingRow(index))?;
        *row = data;
        Ok(())
    }

    fn set_cell(&mut self, index: RowIndex, key: &str, value: Value) -> Result<(), HostError> {
        if !self.columns.iter().any(|column| column.data == key) {
            return Err(HostError::MissingColumn(key.to_string()));
        }
        let row = self
            .rows
            .get_mut(&index)
            .ok_or(HostError::MissingRow(index))?;
        row.insert(key.to_string(), value);
        Ok(())
    }

    fn add_row(&mut self, data: RowData) -> RowIndex {
        let index = RowIndex(self.next_index);
        self.next_index += 1;
        self.rows.insert(index, data);
        index
    }

    fn remove_row(&mut self, index: RowIndex) -> Result<RowData, HostError> {
        self.markers.remove(&index);
        self.rows.remove(&index).ok_or(HostError::MissingRow(index))
    }

    fn restore_rows(&mut self, rows: BTreeMap<RowIndex, RowData>) {
        let after_last = rows.keys().next_back().map_or(0, |index| index.0 + 1);
        self.next_index = self.next_index.max(after_last);
        self.markers.retain(|index, _| rows.contains_key(index));
        self.rows = rows;
    }

    fn markers(&self, index: RowIndex) -> Option<RowMarkers> {
        if !self.rows.contains_key(&index) {
            return None;
        }
        Some(self.markers.get(&index).copied().unwrap_or_default())
    }

    fn set_markers(&mut self, index: RowIndex, markers: RowMarkers) -> Result<(), HostError> {
        if !self.rows.contains_key(&index) {
            return Err(HostError::MissingRow(index));
        }
        self.markers.insert(index, markers);
        Ok(())
    }

    fn draw(&mut self, _reset_paging: bool) {
        self.draws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RowData {
        value.as_object().cloned().expect("fixture should be an object")
    }

    #[test]
    fn added_rows_get_fresh_indices_after_restore() {
        let mut table = MemoryTable::new(
            vec![ColumnMeta::new("val")],
            vec![row(json!({"val": "a"})), row(json!({"val": "b"}))],
        );
        let added = table.add_row(row(json!({"val": "c"})));
        assert_eq!(added, RowIndex(2));

        table.restore_rows(BTreeMap::from([(RowIndex(0), row(json!({"val": "a"})))]));
        let next = table.add_row(row(json!({"val": "d"})));

        assert_eq!(table.len(), 2);
        assert_eq!(next, RowIndex(3));
    }

    #[test]
    fn window_limits_visible_rows() {
        let mut table = MemoryTable::new(
            vec![ColumnMeta::new("val")],
            (0..4).map(|n| row(json!({ "val": n }))).collect(),
        );
        table.set_window(Some(vec![RowIndex(1), RowIndex(3), RowIndex(9)]));

        assert_eq!(table.visible_rows(), vec![RowIndex(1), RowIndex(3)]);
    }

    #[test]
    fn set_cell_rejects_unknown_column() {
        let mut table = MemoryTable::new(vec![ColumnMeta::new("val")], vec![row(json!({}))]);

        assert_eq!(
            table.set_cell(RowIndex(0), "other", json!(1)),
            Err(HostError::MissingColumn("other".to_string()))
        );
        assert!(table.set_cell(RowIndex(0), "val", json!(1)).is_ok());
        assert_eq!(
            table.set_cell(RowIndex(5), "val", json!(1)),
            Err(HostError::MissingRow(RowIndex(5)))
        );
    }
}
