use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use serde_json::Value;

use crate::domain::entities::dataset::{ColumnMeta, DELETED_COLUMN, STATUS_COLUMN};
use crate::domain::entities::row::{RowData, RowIndex};
use crate::infra::memory::table::MemoryTable;
use crate::usecase::ports::repo::StoredTable;

/// Reads a CSV file with a header row. Every column except the lifecycle
/// columns is editable; cells come in as strings.
pub fn read_csv_table(csv_path: &Path) -> Result<StoredTable> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let columns = columns_from_headers(&headers);
    let mut rows = BTreeMap::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.context("failed to parse csv record")?;
        let data: RowData = columns
            .iter()
            .enumerate()
            .map(|(col_idx, column)| {
                let value = record.get(col_idx).unwrap_or("");
                (column.data.clone(), Value::String(value.to_string()))
            })
            .collect();
        rows.insert(RowIndex(row_idx), data);
    }

    Ok(StoredTable { columns, rows })
}

pub fn load_csv_table(csv_path: &Path) -> Result<MemoryTable> {
    let table = read_csv_table(csv_path)?;
    Ok(MemoryTable::new(
        table.columns,
        table.rows.into_values().collect(),
    ))
}

fn columns_from_headers(headers: &StringRecord) -> Vec<ColumnMeta> {
    headers
        .iter()
        .map(|name| {
            let column = ColumnMeta::new(name);
            if name == STATUS_COLUMN || name == DELETED_COLUMN {
                column
            } else {
                column.editable()
            }
        })
        .collect()
}
