use std::sync::Arc;

use crate::domain::entities::dataset::DatasetId;
use crate::usecase::ports::host::HostTable;
use crate::usecase::ports::repo::{RepoError, RowRepository, StoredTable};
use crate::usecase::services::edit_service::TableEditor;

/// "Save all": writes the editor's dirty rows to a repository, then makes
/// the current table the new baseline.
pub struct SaveService {
    repo: Arc<dyn RowRepository>,
    dataset_id: DatasetId,
}

impl SaveService {
    pub fn new(repo: Arc<dyn RowRepository>, dataset_id: DatasetId) -> Self {
        Self { repo, dataset_id }
    }

    pub fn dataset_id(&self) -> DatasetId {
        self.dataset_id
    }

    pub fn load(&self) -> Result<StoredTable, RepoError> {
        self.repo.load_dataset(self.dataset_id)
    }

    /// Returns the number of rows written. The baseline is only replaced
    /// once the repository accepted every row.
    pub fn save_all<H: HostTable>(&self, editor: &mut TableEditor<H>) -> Result<usize, RepoError> {
        if editor.dirty_rows().is_empty() {
            return Ok(0);
        }

        let written = self.repo.save_rows(self.dataset_id, editor.dirty_rows())?;
        editor.save_baseline();
        tracing::info!(dataset = self.dataset_id.0, rows = written, "dirty rows saved");
        Ok(written)
    }
}
