use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::entities::dataset::{ColumnMeta, DatasetId};
use crate::domain::entities::row::{RowData, RowIndex};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("{0}")]
    Message(String),
}

impl From<anyhow::Error> for RepoError {
    fn from(err: anyhow::Error) -> Self {
        RepoError::Message(format!("{err:#}"))
    }
}

/// Where saved rows live between sessions. The editor never calls this;
/// the save-all service does, using the editor's dirty rows.
pub trait RowRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn list_datasets(&self) -> Result<Vec<DatasetMeta>, RepoError>;
    fn create_dataset(&self, meta: NewDatasetMeta, data: StoredTable) -> Result<DatasetId, RepoError>;
    fn load_dataset(&self, id: DatasetId) -> Result<StoredTable, RepoError>;
    /// Upserts the given rows; returns how many were written.
    fn save_rows(
        &self,
        id: DatasetId,
        rows: &BTreeMap<RowIndex, RowData>,
    ) -> Result<usize, RepoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetMeta {
    pub id: DatasetId,
    pub name: String,
    pub row_count: i64,
    pub source_path: String,
    pub saved_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDatasetMeta {
    pub name: String,
    pub source_path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredTable {
    pub columns: Vec<ColumnMeta>,
    pub rows: BTreeMap<RowIndex, RowData>,
}
