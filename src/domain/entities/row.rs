use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of the host dataset: column key to value.
pub type RowData = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowIndex(pub usize);

impl From<usize> for RowIndex {
    fn from(value: usize) -> Self {
        RowIndex(value)
    }
}

impl From<RowIndex> for usize {
    fn from(value: RowIndex) -> Self {
        value.0
    }
}

impl std::fmt::Display for RowIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowStatus {
    Draft,
    Locked,
    Published,
}

impl RowStatus {
    pub fn code(self) -> u8 {
        match self {
            RowStatus::Draft => 0,
            RowStatus::Locked => 1,
            RowStatus::Published => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(RowStatus::Draft),
            1 => Some(RowStatus::Locked),
            2 => Some(RowStatus::Published),
            _ => None,
        }
    }

    /// Reads a stored status cell. Numeric strings count, so a status that
    /// came back from a text input still resolves.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_u64().and_then(Self::from_code),
            Value::String(text) => text.trim().parse::<u64>().ok().and_then(Self::from_code),
            _ => None,
        }
    }

    pub fn to_value(self) -> Value {
        Value::from(self.code())
    }
}

/// Presentation state the host attaches to a rendered row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowMarkers {
    pub locked: bool,
    pub published: bool,
    /// Per-row instance flag; `Some(false)` turns editing off for the row.
    pub editable: Option<bool>,
}

impl RowMarkers {
    pub fn allows_editing(&self) -> bool {
        !self.locked && self.editable != Some(false)
    }
}

/// Renders a cell value the way an input box shows it.
pub fn value_to_input(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parses_numbers_and_numeric_strings() {
        assert_eq!(RowStatus::from_value(&json!(0)), Some(RowStatus::Draft));
        assert_eq!(RowStatus::from_value(&json!("1")), Some(RowStatus::Locked));
        assert_eq!(RowStatus::from_value(&json!(2)), Some(RowStatus::Published));
        assert_eq!(RowStatus::from_value(&json!(7)), None);
        assert_eq!(RowStatus::from_value(&Value::Null), None);
        assert_eq!(RowStatus::from_value(&json!("draft")), None);
    }

    #[test]
    fn input_rendering_blanks_null() {
        assert_eq!(value_to_input(&Value::Null), "");
        assert_eq!(value_to_input(&json!("abc")), "abc");
        assert_eq!(value_to_input(&json!(12)), "12");
    }

    #[test]
    fn locked_markers_block_editing() {
        let mut markers = RowMarkers::default();
        assert!(markers.allows_editing());
        markers.locked = true;
        assert!(!markers.allows_editing());
        markers.locked = false;
        markers.editable = Some(false);
        assert!(!markers.allows_editing());
    }
}
