use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::params;

use crate::domain::entities::dataset::{ColumnMeta, DatasetId};
use crate::domain::entities::row::{RowData, RowIndex};
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::repo::{DatasetMeta, StoredTable};

pub fn insert_columns(
    tx: &rusqlite::Transaction<'_>,
    dataset_id: i64,
    columns: &[ColumnMeta],
) -> Result<()> {
    let mut insert_column = tx
        .prepare("INSERT INTO column_meta(dataset_id, col_idx, settings) VALUES (?1, ?2, ?3)")
        .context("failed to prepare column insert")?;

    for (col_idx, column) in columns.iter().enumerate() {
        let settings =
            serde_json::to_string(column).context("failed to encode column settings")?;
        insert_column
            .execute(params![dataset_id, col_idx as i64, settings])
            .context("failed to insert column")?;
    }

    Ok(())
}

fn upsert_rows(
    tx: &rusqlite::Transaction<'_>,
    dataset_id: i64,
    rows: &BTreeMap<RowIndex, RowData>,
) -> Result<usize> {
    let mut upsert_row = tx
        .prepare(
            "INSERT INTO row_data(dataset_id, row_idx, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(dataset_id, row_idx) DO UPDATE SET data = excluded.data",
        )
        .context("failed to prepare row upsert")?;

    for (index, data) in rows {
        let encoded = serde_json::to_string(data).context("failed to encode row data")?;
        upsert_row
            .execute(params![dataset_id, index.0 as i64, encoded])
            .with_context(|| format!("failed to write row {index}"))?;
    }

    Ok(rows.len())
}

pub fn create_dataset_from_rows(
    db_path: &Path,
    name: &str,
    source_path: &str,
    columns: &[ColumnMeta],
    rows: &BTreeMap<RowIndex, RowData>,
) -> Result<i64> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start dataset create transaction")?;

    tx.execute(
        "INSERT INTO dataset(name, source_path, row_count) VALUES (?1, ?2, ?3)",
        params![name, source_path, rows.len() as i64],
    )
    .context("failed to insert dataset")?;
    let dataset_id = tx.last_insert_rowid();

    insert_columns(&tx, dataset_id, columns)?;
    upsert_rows(&tx, dataset_id, rows)?;

    tx.commit().context("failed to commit dataset create")?;
    Ok(dataset_id)
}

pub fn save_rows(db_path: &Path, dataset_id: i64, rows: &BTreeMap<RowIndex, RowData>) -> Result<usize> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start row save transaction")?;

    let written = upsert_rows(&tx, dataset_id, rows)?;

    let updated = tx
        .execute(
            "UPDATE dataset
             SET row_count = (SELECT COUNT(*) FROM row_data WHERE dataset_id = ?1),
                 saved_at = ?2
             WHERE id = ?1",
            params![dataset_id, Utc::now().to_rfc3339()],
        )
        .context("failed to update dataset after save")?;
    if updated == 0 {
        anyhow::bail!("dataset {dataset_id} does not exist")
    }

    tx.commit().context("failed to commit row save")?;
    Ok(written)
}

pub fn load_dataset(db_path: &Path, dataset_id: i64) -> Result<StoredTable> {
    let conn = open_connection(db_path)?;

    let mut columns_stmt = conn
        .prepare(
            "SELECT settings
             FROM column_meta
             WHERE dataset_id = ?1
             ORDER BY col_idx ASC",
        )
        .context("failed to prepare columns query")?;
    let settings = columns_stmt
        .query_map([dataset_id], |row| row.get::<_, String>(0))
        .context("failed to query columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect columns")?;
    drop(columns_stmt);

    if settings.is_empty() {
        anyhow::bail!("dataset {dataset_id} has no columns")
    }

    let columns = settings
        .iter()
        .map(|text| serde_json::from_str::<ColumnMeta>(text))
        .collect::<serde_json::Result<Vec<_>>>()
        .context("failed to decode column settings")?;

    let mut rows_stmt = conn
        .prepare(
            "SELECT row_idx, data
             FROM row_data
             WHERE dataset_id = ?1
             ORDER BY row_idx ASC",
        )
        .context("failed to prepare rows query")?;
    let row_iter = rows_stmt
        .query_map([dataset_id], |row| {
            let row_idx: i64 = row.get(0)?;
            let data: String = row.get(1)?;
            Ok((row_idx, data))
        })
        .context("failed to query rows")?;

    let mut rows = BTreeMap::new();
    for item in row_iter {
        let (row_idx, text) = item.context("failed to read row")?;
        let data: RowData = serde_json::from_str(&text)
            .with_context(|| format!("failed to decode row {row_idx}"))?;
        rows.insert(RowIndex(row_idx as usize), data);
    }

    Ok(StoredTable { columns, rows })
}

pub fn list_datasets(db_path: &Path) -> Result<Vec<DatasetMeta>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, row_count, source_path, saved_at
             FROM dataset
             ORDER BY id ASC",
        )
        .context("failed to prepare dataset list query")?;

    let datasets = stmt
        .query_map([], |row| {
            Ok(DatasetMeta {
                id: DatasetId(row.get(0)?),
                name: row.get(1)?,
                row_count: row.get(2)?,
                source_path: row.get(3)?,
                saved_at: row.get(4)?,
            })
        })
        .context("failed to query datasets")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect datasets")?;

    Ok(datasets)
}
