use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::entities::dataset::WidgetSpec;
use crate::domain::entities::row::RowIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTarget {
    Existing(RowIndex),
    /// Appended row that the host has not stored yet.
    New,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCell {
    Input { value: String, widget: WidgetSpec },
    Static(Value),
    /// Column not rendered, so there is no cell to read from.
    Hidden,
}

impl SessionCell {
    pub fn input_value(&self) -> Option<&str> {
        match self {
            SessionCell::Input { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// The one row currently open for editing, with its staged input.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    target: SessionTarget,
    cells: Vec<SessionCell>,
    focus: Option<usize>,
}

impl EditSession {
    pub(crate) fn new(target: SessionTarget, cells: Vec<SessionCell>, preferred: Option<usize>) -> Self {
        let is_input = |idx: usize| matches!(cells.get(idx), Some(SessionCell::Input { .. }));
        let focus = preferred
            .filter(|idx| is_input(*idx))
            .or_else(|| (0..cells.len()).find(|idx| is_input(*idx)));

        Self {
            target,
            cells,
            focus,
        }
    }

    pub fn target(&self) -> SessionTarget {
        self.target
    }

    pub fn row(&self) -> Option<RowIndex> {
        match self.target {
            SessionTarget::Existing(index) => Some(index),
            SessionTarget::New => None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.target == SessionTarget::New
    }

    pub fn cells(&self) -> &[SessionCell] {
        &self.cells
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn input(&self, col_idx: usize) -> Option<&str> {
        self.cells.get(col_idx).and_then(SessionCell::input_value)
    }

    /// Stages a value; returns false when the column has no input widget.
    pub fn set_input(&mut self, col_idx: usize, next: impl Into<String>) -> bool {
        match self.cells.get_mut(col_idx) {
            Some(SessionCell::Input { value, .. }) => {
                *value = next.into();
                true
            }
            _ => false,
        }
    }

    pub fn has_inputs(&self) -> bool {
        self.cells
            .iter()
            .any(|cell| matches!(cell, SessionCell::Input { .. }))
    }

    pub fn inputs_all_empty(&self) -> bool {
        self.cells
            .iter()
            .filter_map(SessionCell::input_value)
            .all(str::is_empty)
    }

    pub fn staged_inputs(&self) -> BTreeMap<usize, String> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.input_value().map(|value| (idx, value.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: &str) -> SessionCell {
        SessionCell::Input {
            value: value.to_string(),
            widget: WidgetSpec::default(),
        }
    }

    #[test]
    fn focus_prefers_targeted_input() {
        let cells = vec![input("a"), SessionCell::Static(json!("b")), input("c")];

        let targeted = EditSession::new(SessionTarget::New, cells.clone(), Some(2));
        let static_target = EditSession::new(SessionTarget::New, cells.clone(), Some(1));
        let untargeted = EditSession::new(SessionTarget::New, cells, None);

        assert_eq!(targeted.focus(), Some(2));
        assert_eq!(static_target.focus(), Some(0));
        assert_eq!(untargeted.focus(), Some(0));
    }

    #[test]
    fn set_input_only_touches_widgets() {
        let mut session = EditSession::new(
            SessionTarget::Existing(RowIndex(3)),
            vec![SessionCell::Static(json!(1)), input("")],
            None,
        );

        assert!(session.inputs_all_empty());
        assert!(!session.set_input(0, "x"));
        assert!(session.set_input(1, "y"));
        assert!(!session.inputs_all_empty());
        assert_eq!(session.input(1), Some("y"));
        assert_eq!(session.row(), Some(RowIndex(3)));
        assert_eq!(session.staged_inputs().len(), 1);
    }
}
