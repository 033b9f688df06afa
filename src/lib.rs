//! Inline row editing for tabular datasets.
//!
//! A [`TableEditor`] sits on top of a host table (anything implementing
//! [`HostTable`]) and keeps three things straight: which single row is being
//! edited, which rows differ from the last saved baseline, and what lifecycle
//! status (draft, locked, published) each row is in.

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod infra;
pub mod usecase;

pub use config::EditorOptions;
pub use domain::entities::dataset::{ColumnMeta, WidgetKind, WidgetSpec};
pub use domain::entities::edit::{EditSession, SessionCell, SessionTarget};
pub use domain::entities::row::{RowData, RowIndex, RowMarkers, RowStatus};
pub use domain::lifecycle::Transition;
pub use error::{EditorError, EditorResult};
pub use events::EditorEvent;
pub use infra::memory::table::MemoryTable;
pub use usecase::ports::host::{HostError, HostTable, HostVersion};
pub use usecase::services::edit_service::{
    CommitOutcome, DeleteOutcome, OpenOutcome, ResolveOutcome, RowSelector, TableEditor,
};
