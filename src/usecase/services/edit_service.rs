use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::config::EditorOptions;
use crate::domain::entities::dataset::{ColumnHandles, ColumnMeta};
use crate::domain::entities::edit::{EditSession, SessionCell, SessionTarget};
use crate::domain::entities::row::{value_to_input, RowData, RowIndex, RowStatus};
use crate::domain::ledger::DirtyLedger;
use crate::domain::lifecycle::{DeleteDecision, RowStateMachine, Transition};
use crate::error::{EditorError, EditorResult};
use crate::events::{EditorEvent, EventBus};
use crate::usecase::ports::collaborators::{AcceptAll, EditHandler, Validator};
use crate::usecase::ports::host::HostTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSelector {
    All,
    Visible,
    Rows(Vec<RowIndex>),
}

impl RowSelector {
    pub fn resolve<H: HostTable + ?Sized>(&self, host: &H) -> Vec<RowIndex> {
        match self {
            RowSelector::All => host.row_indices(),
            RowSelector::Visible => host.visible_rows(),
            RowSelector::Rows(rows) => rows.clone(),
        }
    }
}

impl From<RowIndex> for RowSelector {
    fn from(index: RowIndex) -> Self {
        RowSelector::Rows(vec![index])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// A configured edit handler took over the row.
    Delegated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    NoInputs,
    Saved(RowIndex),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Idle,
    Discarded,
    Committed(RowIndex),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    SoftDeleted,
    Removed,
    Refused(RowStatus),
    /// Persisted draft, but the table has no deleted column to flag.
    Unsupported,
}

/// Inline row editing on top of a host table.
///
/// Owns the row state machine, the dirty ledger and the single edit
/// session. Every operation finishes its read-modify-write on the host
/// before returning.
pub struct TableEditor<H: HostTable> {
    host: H,
    options: EditorOptions,
    machine: RowStateMachine,
    ledger: DirtyLedger,
    session: Option<EditSession>,
    validator: Box<dyn Validator>,
    edit_handler: Option<Box<dyn EditHandler>>,
    events: EventBus,
}

impl<H: HostTable> TableEditor<H> {
    pub fn new(host: H, options: EditorOptions) -> EditorResult<Self> {
        let found = host.version();
        if found < options.min_host_version {
            return Err(EditorError::PrerequisiteMissing {
                required: options.min_host_version,
                found,
            });
        }

        let handles = ColumnHandles::resolve(host.columns());
        if handles.status.is_none() {
            tracing::debug!("no status column, row lifecycle disabled");
        }
        if handles.deleted.is_none() {
            tracing::debug!("no deleted column, soft delete disabled");
        }

        let ledger = DirtyLedger::new(host.all_rows());
        let mut editor = Self {
            host,
            options,
            machine: RowStateMachine::new(handles),
            ledger,
            session: None,
            validator: Box::new(AcceptAll),
            edit_handler: None,
            events: EventBus::default(),
        };
        editor.refresh_status();

        tracing::info!(
            rows = editor.ledger.baseline_len(),
            editable = editor.options.editable,
            "table editor attached"
        );
        Ok(editor)
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_edit_handler(mut self, handler: impl EditHandler + 'static) -> Self {
        self.edit_handler = Some(Box::new(handler));
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn handles(&self) -> &ColumnHandles {
        self.machine.handles()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn subscribe_to_events(&self) -> broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    pub fn ledger(&self) -> &DirtyLedger {
        &self.ledger
    }

    pub fn dirty_rows(&self) -> &BTreeMap<RowIndex, RowData> {
        self.ledger.dirty_rows()
    }

    pub fn row_status(&self, index: RowIndex) -> Option<RowStatus> {
        self.host
            .row(index)
            .and_then(|data| self.machine.status_of(&data))
    }

    /// Whether row `index` may be opened. Decided from the stored status;
    /// rows without one fall back to their markers. Published rows only open
    /// when committing is allowed to take them off display.
    pub fn row_is_editable(&self, index: RowIndex) -> bool {
        let Some(data) = self.host.row(index) else {
            return false;
        };
        let markers = self.host.markers(index).unwrap_or_default();
        match self.machine.status_of(&data) {
            Some(RowStatus::Draft) => markers.editable != Some(false),
            Some(RowStatus::Published) if self.options.unpublish_on_edit => {
                markers.editable != Some(false)
            }
            Some(RowStatus::Locked | RowStatus::Published) => false,
            None => markers.allows_editing(),
        }
    }

    /// Whether `col_idx` of row `index` gets an input widget.
    pub fn is_editable(&self, index: RowIndex, col_idx: usize) -> bool {
        self.row_is_editable(index)
            && self
                .host
                .columns()
                .get(col_idx)
                .is_some_and(ColumnMeta::is_editable)
    }

    /// Opens row `index` for editing, resolving any other open row first.
    /// `target_col` is the clicked cell and gets focus when it is editable.
    pub fn open_session(
        &mut self,
        index: RowIndex,
        target_col: Option<usize>,
    ) -> EditorResult<OpenOutcome> {
        if !self.options.editable {
            return Err(EditorError::Disabled);
        }
        if let Some(active) = &self.session {
            if active.row() == Some(index) {
                return Err(EditorError::session_conflict(format!(
                    "row {index} is already being edited"
                )));
            }
        }

        let data = self
            .host
            .row(index)
            .ok_or(EditorError::RowNotFound(index))?;
        let columns = self.host.columns();
        let has_editable_cell = columns
            .iter()
            .any(|column| column.visible && column.is_editable());
        if !self.row_is_editable(index) || !has_editable_cell {
            tracing::debug!(%index, "refusing to open non-editable row");
            return Err(EditorError::not_editable(format!("row {index}")));
        }

        if self.session.is_some() {
            if let Err(err) = self.resolve_session() {
                tracing::debug!(%index, error = %err, "open refused, active session kept");
                return Err(EditorError::session_conflict(err.to_string()));
            }
        }

        if let Some(handler) = self.edit_handler.as_mut() {
            handler.edit(index, &data, self.host.columns());
            return Ok(OpenOutcome::Delegated);
        }

        let cells = self
            .host
            .columns()
            .iter()
            .map(|column| {
                let value = data.get(&column.data).cloned().unwrap_or(Value::Null);
                if !column.visible {
                    SessionCell::Hidden
                } else if column.is_editable() {
                    SessionCell::Input {
                        value: value_to_input(&value),
                        widget: column.widget_spec(),
                    }
                } else {
                    SessionCell::Static(value)
                }
            })
            .collect();

        self.session = Some(EditSession::new(
            SessionTarget::Existing(index),
            cells,
            target_col,
        ));
        tracing::debug!(%index, "edit session opened");
        Ok(OpenOutcome::Opened)
    }

    /// Starts an edit session for a row the host does not have yet. Every
    /// visible column gets an input regardless of editability.
    pub fn add_row(&mut self) -> EditorResult<()> {
        if !self.options.editable {
            return Err(EditorError::Disabled);
        }
        if self.session.is_some() {
            return Err(EditorError::session_conflict(
                "finish the open row before adding another",
            ));
        }

        let cells = self
            .host
            .columns()
            .iter()
            .map(|column| {
                if column.visible {
                    SessionCell::Input {
                        value: String::new(),
                        widget: column.widget_spec(),
                    }
                } else {
                    SessionCell::Hidden
                }
            })
            .collect();

        self.session = Some(EditSession::new(SessionTarget::New, cells, None));
        tracing::debug!("new row session opened");
        Ok(())
    }

    pub fn set_input(&mut self, col_idx: usize, value: impl Into<String>) -> EditorResult<()> {
        let session = self.session.as_mut().ok_or(EditorError::NoActiveSession)?;
        if session.set_input(col_idx, value) {
            Ok(())
        } else {
            Err(EditorError::not_editable(format!("column {col_idx}")))
        }
    }

    /// Validates the open session and writes it to the host. On failure the
    /// session stays open and nothing is written.
    pub fn commit_session(&mut self) -> EditorResult<CommitOutcome> {
        let session = self.session.as_ref().ok_or(EditorError::NoActiveSession)?;
        if !session.has_inputs() {
            return Ok(CommitOutcome::NoInputs);
        }

        if let Err(message) = self.validator.validate(session, self.host.columns()) {
            tracing::debug!(%message, "commit refused by validator");
            return Err(EditorError::ValidationFailure(message));
        }

        let index = match session.target() {
            SessionTarget::New => {
                let data = self.collect_new_row(session);
                self.host.add_row(data)
            }
            SessionTarget::Existing(index) => {
                let previous = self
                    .host
                    .row(index)
                    .ok_or(EditorError::RowNotFound(index))?;
                let data = self.merge_existing_row(session, &previous);
                self.host.set_row(index, data)?;
                index
            }
        };

        self.session = None;
        self.host.draw(false);
        self.refresh_status();
        self.after_save(index);
        tracing::debug!(%index, "edit session committed");
        Ok(CommitOutcome::Saved(index))
    }

    /// Closes the session without writing anything.
    pub fn discard_session(&mut self) -> Option<EditSession> {
        let session = self.session.take();
        if let Some(session) = &session {
            tracing::debug!(row = ?session.row(), new = session.is_new(), "edit session discarded");
        }
        session
    }

    /// Click-away and confirm-key handling: a session with only empty inputs
    /// is dropped, anything else is committed.
    pub fn resolve_session(&mut self) -> EditorResult<ResolveOutcome> {
        let Some(session) = &self.session else {
            return Ok(ResolveOutcome::Idle);
        };

        if session.inputs_all_empty() {
            self.discard_session();
            return Ok(ResolveOutcome::Discarded);
        }

        match self.commit_session()? {
            CommitOutcome::Saved(index) => Ok(ResolveOutcome::Committed(index)),
            CommitOutcome::NoInputs => {
                self.discard_session();
                Ok(ResolveOutcome::Discarded)
            }
        }
    }

    pub fn delete_row(&mut self, index: RowIndex) -> EditorResult<DeleteOutcome> {
        let mut data = self
            .host
            .row(index)
            .ok_or(EditorError::RowNotFound(index))?;

        match self.machine.delete_decision(&data) {
            DeleteDecision::Refused(status) => {
                tracing::info!(%index, ?status, "delete refused");
                Ok(DeleteOutcome::Refused(status))
            }
            DeleteDecision::SoftDelete => {
                if !self.machine.mark_deleted(&mut data) {
                    tracing::warn!(%index, "cannot soft delete without a deleted column");
                    return Ok(DeleteOutcome::Unsupported);
                }
                self.drop_session_on(index);
                self.host.set_row(index, data)?;
                self.host.draw(false);
                self.refresh_status();
                self.after_save(index);
                Ok(DeleteOutcome::SoftDeleted)
            }
            DeleteDecision::Purge => {
                self.drop_session_on(index);
                self.host.remove_row(index)?;
                self.ledger.forget(index);
                self.host.draw(false);
                self.refresh_status();
                tracing::debug!(%index, "unsaved row removed");
                Ok(DeleteOutcome::Removed)
            }
        }
    }

    pub fn lock_rows(&mut self, selector: &RowSelector) -> EditorResult<Vec<RowIndex>> {
        self.apply_transition(selector, Transition::Lock)
    }

    pub fn unlock_rows(&mut self, selector: &RowSelector) -> EditorResult<Vec<RowIndex>> {
        self.apply_transition(selector, Transition::Unlock)
    }

    pub fn publish_rows(&mut self, selector: &RowSelector) -> EditorResult<Vec<RowIndex>> {
        self.apply_transition(selector, Transition::Publish)
    }

    pub fn unpublish_rows(&mut self, selector: &RowSelector) -> EditorResult<Vec<RowIndex>> {
        self.apply_transition(selector, Transition::Unpublish)
    }

    /// Re-checks one row against the baseline. Returns whether it is dirty.
    pub fn update_row_state(&mut self, index: RowIndex) -> bool {
        let current = self.host.row(index);
        self.ledger.reconcile(index, current.as_ref())
    }

    pub fn save_baseline(&mut self) {
        let rows = self.host.all_rows();
        let count = rows.len();
        self.ledger.snapshot(rows);
        tracing::info!(rows = count, "baseline saved");
        self.events.emit(EditorEvent::BaselineSaved { rows: count });
    }

    /// Puts every row back to the baseline and forgets all dirty edits.
    pub fn rollback(&mut self) {
        if self.discard_session().is_some() {
            tracing::debug!("open session dropped by rollback");
        }
        let rows = self.ledger.rollback();
        self.events.emit_rolled_back(&rows);
        self.host.restore_rows(rows);
        self.host.draw(true);
        self.refresh_status();
        tracing::info!("table rolled back to baseline");
    }

    /// Host redraw hook.
    pub fn on_table_redrawn(&mut self) -> usize {
        self.refresh_status()
    }

    /// Re-applies status markers to the rows in view. Returns how many rows
    /// had their markers changed.
    pub fn refresh_status(&mut self) -> usize {
        self.host
            .visible_rows()
            .into_iter()
            .filter(|index| self.refresh_row(*index))
            .count()
    }

    /// Re-derives the markers of a single row. Returns whether they changed.
    fn refresh_row(&mut self, index: RowIndex) -> bool {
        let Some(data) = self.host.row(index) else {
            return false;
        };
        let current = self.host.markers(index).unwrap_or_default();
        let next = self.machine.derive_markers(&data, current);
        if next == current {
            return false;
        }
        match self.host.set_markers(index, next) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%index, error = %err, "failed to update row markers");
                false
            }
        }
    }

    /// Moves one row through `transition`. Refused transitions leave the row
    /// untouched.
    pub fn transition_row(
        &mut self,
        index: RowIndex,
        transition: Transition,
    ) -> EditorResult<RowStatus> {
        let mut data = self
            .host
            .row(index)
            .ok_or(EditorError::RowNotFound(index))?;
        let current = self.machine.status_of(&data);
        let (Some(handle), Some(status)) = (
            self.machine.handles().status.clone(),
            self.machine.transition(&mut data, transition),
        ) else {
            return Err(EditorError::TransitionRefused {
                row: index,
                transition: transition.name(),
                status: current,
            });
        };

        self.host.set_cell(index, &handle.key, status.to_value())?;
        self.refresh_row(index);
        self.update_row_state(index);
        self.events.emit(EditorEvent::StatusChanged { index, status });
        Ok(status)
    }

    fn apply_transition(
        &mut self,
        selector: &RowSelector,
        transition: Transition,
    ) -> EditorResult<Vec<RowIndex>> {
        if !self.machine.tracks_status() {
            tracing::warn!(transition = transition.name(), "no status column, ignoring");
            return Ok(Vec::new());
        }

        let mut changed = Vec::new();
        for index in selector.resolve(&self.host) {
            match self.transition_row(index, transition) {
                Ok(_) => changed.push(index),
                Err(EditorError::TransitionRefused { status, .. }) => {
                    tracing::debug!(%index, ?status, transition = transition.name(), "transition refused");
                }
                Err(err) => return Err(err),
            }
        }

        if !changed.is_empty() {
            self.host.draw(false);
            self.refresh_status();
        }
        Ok(changed)
    }

    fn collect_new_row(&self, session: &EditSession) -> RowData {
        self.host
            .columns()
            .iter()
            .zip(session.cells())
            .map(|(column, cell)| {
                let value = match cell.input_value() {
                    Some(input) if column.visible => Value::String(input.to_string()),
                    _ => Value::Null,
                };
                (column.data.clone(), value)
            })
            .collect()
    }

    fn merge_existing_row(&self, session: &EditSession, previous: &RowData) -> RowData {
        let mut data = previous.clone();
        for (column, cell) in self.host.columns().iter().zip(session.cells()) {
            let Some(input) = cell.input_value() else {
                continue;
            };
            let current = previous.get(&column.data).unwrap_or(&Value::Null);
            if value_to_input(current) != input {
                data.insert(column.data.clone(), Value::String(input.to_string()));
            }
        }

        if self.options.unpublish_on_edit
            && data != *previous
            && self.machine.status_of(previous) == Some(RowStatus::Published)
        {
            self.machine.transition(&mut data, Transition::Unpublish);
        }
        data
    }

    fn after_save(&mut self, index: RowIndex) {
        let Some(data) = self.host.row(index) else {
            return;
        };
        self.ledger.reconcile(index, Some(&data));
        self.events.emit_row_saved(index, &data);
    }

    fn drop_session_on(&mut self, index: RowIndex) {
        if self.session.as_ref().and_then(EditSession::row) == Some(index) {
            self.discard_session();
        }
    }
}
