//! Editor Events
//!
//! Notifications for collaborators (persistence, UI adapters) that want to
//! follow what the editor does to the host table. Events go out on a tokio
//! broadcast channel; sending and `try_recv` are both synchronous, so no
//! runtime is needed.

use std::collections::BTreeMap;

use tokio::sync::broadcast;

use crate::domain::entities::row::{RowData, RowIndex, RowStatus};

pub const EDITOR_EVENT_CHANNEL_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A commit or soft delete wrote this data to the row
    RowSaved { index: RowIndex, data: RowData },

    StatusChanged { index: RowIndex, status: RowStatus },

    /// Current rows became the new baseline
    BaselineSaved { rows: usize },

    /// The table was reset to the baseline
    RolledBack { rows: usize },
}

impl EditorEvent {
    pub fn event_type(&self) -> &str {
        match self {
            EditorEvent::RowSaved { .. } => "row:saved",
            EditorEvent::StatusChanged { .. } => "row:status",
            EditorEvent::BaselineSaved { .. } => "table:baseline",
            EditorEvent::RolledBack { .. } => "table:rollback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EditorEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(EDITOR_EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl EventBus {
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.tx.subscribe()
    }

    /// Sends to every subscriber; having none is not an error.
    pub fn emit(&self, event: EditorEvent) {
        tracing::debug!(event = event.event_type(), "emitting editor event");
        let _ = self.tx.send(event);
    }

    pub fn emit_row_saved(&self, index: RowIndex, data: &RowData) {
        self.emit(EditorEvent::RowSaved {
            index,
            data: data.clone(),
        });
    }

    pub fn emit_rolled_back(&self, rows: &BTreeMap<RowIndex, RowData>) {
        self.emit(EditorEvent::RolledBack { rows: rows.len() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn emit_without_subscribers_is_ignored() {
        let bus = EventBus::default();
        bus.emit(EditorEvent::BaselineSaved { rows: 1 });

        let mut rx = bus.subscribe();
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn every_subscriber_receives_events() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.emit(EditorEvent::StatusChanged {
            index: RowIndex(2),
            status: RowStatus::Locked,
        });

        let expected = EditorEvent::StatusChanged {
            index: RowIndex(2),
            status: RowStatus::Locked,
        };
        assert_eq!(first.try_recv().expect("first should receive"), expected);
        assert_eq!(second.try_recv().expect("second should receive"), expected);
        assert_eq!(expected.event_type(), "row:status");
    }
}
