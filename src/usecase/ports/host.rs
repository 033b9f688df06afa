use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::entities::dataset::ColumnMeta;
use crate::domain::entities::row::{RowData, RowIndex, RowMarkers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl HostVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for HostVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("row {0} does not exist")]
    MissingRow(RowIndex),

    #[error("column '{0}' does not exist")]
    MissingColumn(String),
}

/// The tabular component that owns row storage and rendering.
///
/// The editor reads copies out of it and writes whole rows or single cells
/// back; it never keeps a borrow across calls.
pub trait HostTable {
    fn version(&self) -> HostVersion;

    fn columns(&self) -> &[ColumnMeta];

    fn row_indices(&self) -> Vec<RowIndex>;

    /// Rows currently in view after paging and filtering.
    fn visible_rows(&self) -> Vec<RowIndex>;

    fn row(&self, index: RowIndex) -> Option<RowData>;

    fn set_row(&mut self, index: RowIndex, data: RowData) -> Result<(), HostError>;

    fn set_cell(&mut self, index: RowIndex, key: &str, value: Value) -> Result<(), HostError>;

    /// Stores a new row; the host picks its index.
    fn add_row(&mut self, data: RowData) -> RowIndex;

    fn remove_row(&mut self, index: RowIndex) -> Result<RowData, HostError>;

    /// Replaces the whole row set, keeping the given indices.
    fn restore_rows(&mut self, rows: BTreeMap<RowIndex, RowData>);

    fn markers(&self, index: RowIndex) -> Option<RowMarkers>;

    fn set_markers(&mut self, index: RowIndex, markers: RowMarkers) -> Result<(), HostError>;

    fn draw(&mut self, reset_paging: bool);

    fn all_rows(&self) -> BTreeMap<RowIndex, RowData> {
        self.row_indices()
            .into_iter()
            .filter_map(|index| self.row(index).map(|data| (index, data)))
            .collect()
    }
}

impl<T: HostTable + ?Sized> HostTable for &mut T {
    fn version(&self) -> HostVersion {
        (**self).version()
    }

    fn columns(&self) -> &[ColumnMeta] {
        (**self).columns()
    }

    fn row_indices(&self) -> Vec<RowIndex> {
        (**self).row_indices()
    }

    fn visible_rows(&self) -> Vec<RowIndex> {
        (**self).visible_rows()
    }

    fn row(&self, index: RowIndex) -> Option<RowData> {
        (**self).row(index)
    }

    fn set_row(&mut self, index: RowIndex, data: RowData) -> Result<(), HostError> {
        (**self).set_row(index, data)
    }

    fn set_cell(&mut self, index: RowIndex, key: &str, value: Value) -> Result<(), HostError> {
        (**self).set_cell(index, key, value)
    }

    fn add_row(&mut self, data: RowData) -> RowIndex {
        (**self).add_row(data)
    }

    fn remove_row(&mut self, index: RowIndex) -> Result<RowData, HostError> {
        (**self).remove_row(index)
    }

    fn restore_rows(&mut self, rows: BTreeMap<RowIndex, RowData>) {
        (**self).restore_rows(rows)
    }

    fn markers(&self, index: RowIndex) -> Option<RowMarkers> {
        (**self).markers(index)
    }

    fn set_markers(&mut self, index: RowIndex, markers: RowMarkers) -> Result<(), HostError> {
        (**self).set_markers(index, markers)
    }

    fn draw(&mut self, reset_paging: bool) {
        (**self).draw(reset_paging)
    }
}
