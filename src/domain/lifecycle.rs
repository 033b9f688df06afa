//! Row lifecycle: Draft, Locked, Published, plus the soft-delete flag.
//!
//! Every transition is requested from outside; nothing here changes a row on
//! its own. The machine reads and writes status through the column handles
//! resolved when the table was attached, and a missing handle turns the
//! corresponding feature off.

use serde_json::Value;

use crate::domain::entities::dataset::ColumnHandles;
use crate::domain::entities::row::{RowData, RowMarkers, RowStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unlock,
    Lock,
    Publish,
    Unpublish,
}

impl Transition {
    /// Target status, or `None` when the transition is refused from `current`.
    pub fn target(self, current: Option<RowStatus>) -> Option<RowStatus> {
        match self {
            Transition::Unlock => Some(RowStatus::Draft),
            Transition::Lock => Some(RowStatus::Locked),
            Transition::Publish => Some(RowStatus::Published),
            Transition::Unpublish => match current {
                Some(RowStatus::Published) => Some(RowStatus::Locked),
                _ => None,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Transition::Unlock => "unlock",
            Transition::Lock => "lock",
            Transition::Publish => "publish",
            Transition::Unpublish => "unpublish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDecision {
    /// Persisted draft: keep the row, flag it deleted.
    SoftDelete,
    /// Never persisted: drop the row and its ledger entry.
    Purge,
    Refused(RowStatus),
}

#[derive(Debug, Clone, Default)]
pub struct RowStateMachine {
    handles: ColumnHandles,
}

impl RowStateMachine {
    pub fn new(handles: ColumnHandles) -> Self {
        Self { handles }
    }

    pub fn handles(&self) -> &ColumnHandles {
        &self.handles
    }

    pub fn tracks_status(&self) -> bool {
        self.handles.status.is_some()
    }

    pub fn status_of(&self, row: &RowData) -> Option<RowStatus> {
        let handle = self.handles.status.as_ref()?;
        row.get(&handle.key).and_then(RowStatus::from_value)
    }

    /// Applies `transition` to the row data in place and returns the new status.
    pub fn transition(&self, row: &mut RowData, transition: Transition) -> Option<RowStatus> {
        let handle = self.handles.status.as_ref()?;
        let next = transition.target(self.status_of(row))?;
        row.insert(handle.key.clone(), next.to_value());
        Some(next)
    }

    pub fn delete_decision(&self, row: &RowData) -> DeleteDecision {
        match self.status_of(row) {
            Some(RowStatus::Draft) => DeleteDecision::SoftDelete,
            Some(status) => DeleteDecision::Refused(status),
            None => DeleteDecision::Purge,
        }
    }

    /// Writes the soft-delete flag; false when no deleted column exists.
    pub fn mark_deleted(&self, row: &mut RowData) -> bool {
        match self.handles.deleted.as_ref() {
            Some(handle) => {
                row.insert(handle.key.clone(), Value::Bool(true));
                true
            }
            None => false,
        }
    }

    pub fn is_deleted(&self, row: &RowData) -> bool {
        let Some(handle) = self.handles.deleted.as_ref() else {
            return false;
        };
        match row.get(&handle.key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(number)) => number.as_u64().is_some_and(|n| n != 0),
            Some(Value::String(text)) => matches!(text.as_str(), "1" | "true"),
            _ => false,
        }
    }

    /// Markers a rendered row should carry for its current status.
    pub fn derive_markers(&self, row: &RowData, current: RowMarkers) -> RowMarkers {
        match self.status_of(row) {
            Some(RowStatus::Draft) => RowMarkers {
                locked: false,
                published: false,
                ..current
            },
            Some(RowStatus::Locked) => RowMarkers {
                locked: true,
                published: false,
                ..current
            },
            Some(RowStatus::Published) => RowMarkers {
                locked: true,
                published: true,
                ..current
            },
            None => current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::dataset::ColumnMeta;
    use serde_json::json;

    fn machine() -> RowStateMachine {
        RowStateMachine::new(ColumnHandles::resolve(&[
            ColumnMeta::new("title"),
            ColumnMeta::new("status"),
            ColumnMeta::new("deleted"),
        ]))
    }

    fn row(value: Value) -> RowData {
        value.as_object().cloned().expect("fixture should be an object")
    }

    #[test]
    fn unlock_lock_publish_always_apply() {
        let machine = machine();
        for start in [0, 1, 2] {
            let mut data = row(json!({"status": start}));
            assert_eq!(machine.transition(&mut data, Transition::Unlock), Some(RowStatus::Draft));
            assert_eq!(machine.transition(&mut data, Transition::Lock), Some(RowStatus::Locked));
            assert_eq!(
                machine.transition(&mut data, Transition::Publish),
                Some(RowStatus::Published)
            );
            assert_eq!(data["status"], json!(2));
        }
    }

    #[test]
    fn unpublish_only_leaves_published() {
        let machine = machine();
        let mut published = row(json!({"status": 2}));
        let mut draft = row(json!({"status": 0}));

        assert_eq!(
            machine.transition(&mut published, Transition::Unpublish),
            Some(RowStatus::Locked)
        );
        assert_eq!(machine.transition(&mut draft, Transition::Unpublish), None);
        assert_eq!(draft["status"], json!(0));
    }

    #[test]
    fn delete_gated_on_draft() {
        let machine = machine();

        assert_eq!(
            machine.delete_decision(&row(json!({"status": 0}))),
            DeleteDecision::SoftDelete
        );
        assert_eq!(
            machine.delete_decision(&row(json!({"status": 1}))),
            DeleteDecision::Refused(RowStatus::Locked)
        );
        assert_eq!(
            machine.delete_decision(&row(json!({"status": "2"}))),
            DeleteDecision::Refused(RowStatus::Published)
        );
        assert_eq!(
            machine.delete_decision(&row(json!({"status": null}))),
            DeleteDecision::Purge
        );
    }

    #[test]
    fn markers_follow_status() {
        let machine = machine();
        let published = machine.derive_markers(&row(json!({"status": 2})), RowMarkers::default());
        let locked = machine.derive_markers(&row(json!({"status": 1})), published);
        let draft = machine.derive_markers(&row(json!({"status": 0})), locked);

        assert!(published.locked && published.published);
        assert!(locked.locked && !locked.published);
        assert!(!draft.locked && !draft.published);
    }

    #[test]
    fn no_status_column_disables_transitions() {
        let machine = RowStateMachine::new(ColumnHandles::resolve(&[ColumnMeta::new("title")]));
        let mut data = row(json!({"title": "x"}));

        assert!(!machine.tracks_status());
        assert_eq!(machine.transition(&mut data, Transition::Lock), None);
        assert!(!machine.mark_deleted(&mut data));
        assert_eq!(machine.delete_decision(&data), DeleteDecision::Purge);
    }
}
