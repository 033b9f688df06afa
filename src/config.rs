use serde::{Deserialize, Serialize};

use crate::usecase::ports::host::HostVersion;

/// Oldest host table the editor attaches to.
pub const MIN_HOST_VERSION: HostVersion = HostVersion::new(1, 10, 8);

/// Table-level editor settings, usually taken from the table's init options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Turns inline editing on for the table.
    pub editable: bool,
    /// Committing changed data on a published row takes it off display.
    pub unpublish_on_edit: bool,
    pub min_host_version: HostVersion,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            editable: false,
            unpublish_on_edit: true,
            min_host_version: MIN_HOST_VERSION,
        }
    }
}

impl EditorOptions {
    pub fn editable() -> Self {
        Self {
            editable: true,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_keep_editing_off() {
        let options = EditorOptions::from_json("{}").expect("empty options should parse");

        assert_eq!(options, EditorOptions::default());
        assert!(!options.editable);
        assert!(options.unpublish_on_edit);
    }

    #[test]
    fn camel_case_keys_are_read() {
        let options = EditorOptions::from_json(
            r#"{"editable":true,"unpublishOnEdit":false,"minHostVersion":{"major":2,"minor":0,"patch":0}}"#,
        )
        .expect("options should parse");

        assert!(options.editable);
        assert!(!options.unpublish_on_edit);
        assert_eq!(options.min_host_version, HostVersion::new(2, 0, 0));
    }
}
