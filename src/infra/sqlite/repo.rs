use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::entities::dataset::DatasetId;
use crate::domain::entities::row::{RowData, RowIndex};
use crate::infra::sqlite::queries::{create_dataset_from_rows, list_datasets, load_dataset, save_rows};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{
    DatasetMeta, NewDatasetMeta, RepoError, RowRepository, StoredTable,
};

pub struct SqliteRepo {
    pub db_path: PathBuf,
}

impl SqliteRepo {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl RowRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        Ok(init_db(&self.db_path)?)
    }

    fn list_datasets(&self) -> Result<Vec<DatasetMeta>, RepoError> {
        Ok(list_datasets(&self.db_path)?)
    }

    fn create_dataset(&self, meta: NewDatasetMeta, data: StoredTable) -> Result<DatasetId, RepoError> {
        let dataset_id = create_dataset_from_rows(
            &self.db_path,
            &meta.name,
            &meta.source_path,
            &data.columns,
            &data.rows,
        )?;

        Ok(DatasetId(dataset_id))
    }

    fn load_dataset(&self, id: DatasetId) -> Result<StoredTable, RepoError> {
        Ok(load_dataset(&self.db_path, id.0)?)
    }

    fn save_rows(
        &self,
        id: DatasetId,
        rows: &BTreeMap<RowIndex, RowData>,
    ) -> Result<usize, RepoError> {
        Ok(save_rows(&self.db_path, id.0, rows)?)
    }
}
