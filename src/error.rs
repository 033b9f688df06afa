//! Editor Error Types
//!
//! Refusals (validation, session conflicts, gated transitions) leave every
//! piece of state untouched and are reported to the caller, who decides
//! whether the user sees anything. Only `PrerequisiteMissing` is fatal, and
//! only at construction.

use thiserror::Error;

use crate::domain::entities::row::{RowIndex, RowStatus};
use crate::usecase::ports::host::{HostError, HostVersion};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Staged input was rejected by the configured validator
    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    /// The row's current status does not allow the transition
    #[error("Transition '{transition}' refused for row {row} in status {status:?}")]
    TransitionRefused {
        row: RowIndex,
        transition: &'static str,
        status: Option<RowStatus>,
    },

    /// Another edit session is open and could not be resolved
    #[error("Edit session already open: {0}")]
    SessionConflict(String),

    /// The host table cannot support the editor
    #[error("Host table {found} is older than required {required}")]
    PrerequisiteMissing {
        required: HostVersion,
        found: HostVersion,
    },

    /// Inline editing is switched off for the table
    #[error("Editing is disabled for this table")]
    Disabled,

    #[error("Not editable: {0}")]
    NotEditable(String),

    #[error("No edit session is open")]
    NoActiveSession,

    #[error("Row not found: {0}")]
    RowNotFound(RowIndex),

    #[error("Host table error: {0}")]
    Host(#[from] HostError),
}

impl EditorError {
    pub fn session_conflict(context: impl Into<String>) -> Self {
        Self::SessionConflict(context.into())
    }

    pub fn not_editable(context: impl Into<String>) -> Self {
        Self::NotEditable(context.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailure(message.into())
    }

    /// Refusals are expected outcomes of user interaction, not faults.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            EditorError::ValidationFailure(_)
                | EditorError::TransitionRefused { .. }
                | EditorError::SessionConflict(_)
                | EditorError::NotEditable(_)
        )
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
