use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_COLUMN: &str = "status";
pub const DELETED_COLUMN: &str = "deleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId(pub i64);

impl From<i64> for DatasetId {
    fn from(value: i64) -> Self {
        DatasetId(value)
    }
}

impl From<DatasetId> for i64 {
    fn from(value: DatasetId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    #[default]
    Text,
    Select,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetSpec {
    #[serde(rename = "type", default)]
    pub kind: WidgetKind,
    #[serde(default)]
    pub options: Vec<Value>,
}

/// Column settings as the host table declares them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMeta {
    pub data: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub header_editable: Option<bool>,
    #[serde(default)]
    pub widget: Option<WidgetSpec>,
}

fn default_visible() -> bool {
    true
}

impl ColumnMeta {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            name: None,
            visible: true,
            editable: false,
            header_editable: None,
            widget: None,
        }
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_widget(mut self, widget: WidgetSpec) -> Self {
        self.widget = Some(widget);
        self
    }

    /// Editable either on the column itself or through the header override.
    pub fn is_editable(&self) -> bool {
        self.editable || self.header_editable == Some(true)
    }

    pub fn answers_to(&self, key: &str) -> bool {
        self.data == key || self.name.as_deref() == Some(key)
    }

    pub fn widget_spec(&self) -> WidgetSpec {
        self.widget.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHandle {
    pub index: usize,
    pub key: String,
}

/// Well-known columns, resolved once per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnHandles {
    pub status: Option<ColumnHandle>,
    pub deleted: Option<ColumnHandle>,
}

impl ColumnHandles {
    pub fn resolve(columns: &[ColumnMeta]) -> Self {
        let find = |key: &str| {
            columns
                .iter()
                .enumerate()
                .rev()
                .find(|(_, column)| column.answers_to(key))
                .map(|(index, column)| ColumnHandle {
                    index,
                    key: column.data.clone(),
                })
        };

        Self {
            status: find(STATUS_COLUMN),
            deleted: find(DELETED_COLUMN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_resolve_by_data_or_name() {
        let mut renamed = ColumnMeta::new("state_code");
        renamed.name = Some("status".to_string());
        let columns = vec![ColumnMeta::new("title"), renamed, ColumnMeta::new("deleted")];

        let handles = ColumnHandles::resolve(&columns);

        assert_eq!(
            handles.status,
            Some(ColumnHandle {
                index: 1,
                key: "state_code".to_string()
            })
        );
        assert_eq!(handles.deleted.map(|h| h.index), Some(2));
    }

    #[test]
    fn missing_handles_disable_the_feature() {
        let handles = ColumnHandles::resolve(&[ColumnMeta::new("title")]);

        assert_eq!(handles, ColumnHandles::default());
    }

    #[test]
    fn column_settings_deserialize_with_defaults() {
        let column: ColumnMeta = serde_json::from_str(
            r#"{"data":"qty","headerEditable":true,"widget":{"type":"select","options":[1,2]}}"#,
        )
        .expect("column json should parse");

        assert!(column.visible);
        assert!(!column.editable);
        assert!(column.is_editable());
        assert_eq!(column.widget_spec().kind, WidgetKind::Select);
        assert_eq!(column.widget_spec().options.len(), 2);
    }
}
