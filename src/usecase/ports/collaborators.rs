use crate::domain::entities::dataset::ColumnMeta;
use crate::domain::entities::edit::EditSession;
use crate::domain::entities::row::{RowData, RowIndex};

/// Form validation run before a session is committed.
pub trait Validator {
    fn validate(&self, session: &EditSession, columns: &[ColumnMeta]) -> Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&EditSession, &[ColumnMeta]) -> Result<(), String>,
{
    fn validate(&self, session: &EditSession, columns: &[ColumnMeta]) -> Result<(), String> {
        self(session, columns)
    }
}

/// Accepts everything; used when no validator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _session: &EditSession, _columns: &[ColumnMeta]) -> Result<(), String> {
        Ok(())
    }
}

/// Rejects a session that leaves any of the named columns blank.
#[derive(Debug, Clone, Default)]
pub struct RequiredColumns {
    keys: Vec<String>,
}

impl RequiredColumns {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for RequiredColumns {
    fn validate(&self, session: &EditSession, columns: &[ColumnMeta]) -> Result<(), String> {
        for (col_idx, column) in columns.iter().enumerate() {
            if !self.keys.iter().any(|key| column.answers_to(key)) {
                continue;
            }
            if let Some(value) = session.input(col_idx) {
                if value.trim().is_empty() {
                    return Err(format!("{} is required", column.data));
                }
            }
        }
        Ok(())
    }
}

/// Replaces inline editing for tables that edit rows elsewhere (a dialog,
/// a side panel). Receives a copy of the row that was clicked.
pub trait EditHandler {
    fn edit(&mut self, index: RowIndex, row: &RowData, columns: &[ColumnMeta]);
}

impl<F> EditHandler for F
where
    F: FnMut(RowIndex, &RowData, &[ColumnMeta]),
{
    fn edit(&mut self, index: RowIndex, row: &RowData, columns: &[ColumnMeta]) {
        self(index, row, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::dataset::WidgetSpec;
    use crate::domain::entities::edit::{SessionCell, SessionTarget};

    fn session(values: &[&str]) -> EditSession {
        EditSession::new(
            SessionTarget::New,
            values
                .iter()
                .map(|value| SessionCell::Input {
                    value: value.to_string(),
                    widget: WidgetSpec::default(),
                })
                .collect(),
            None,
        )
    }

    #[test]
    fn required_columns_rejects_blank_input() {
        let columns = vec![ColumnMeta::new("name"), ColumnMeta::new("qty")];
        let validator = RequiredColumns::new(["qty"]);

        assert!(validator.validate(&session(&["", "5"]), &columns).is_ok());
        assert_eq!(
            validator.validate(&session(&["a", "  "]), &columns),
            Err("qty is required".to_string())
        );
    }

    #[test]
    fn closures_act_as_validators() {
        let reject =
            |_: &EditSession, _: &[ColumnMeta]| -> Result<(), String> { Err("nope".to_string()) };

        assert!(reject.validate(&session(&["x"]), &[]).is_err());
        assert!(AcceptAll.validate(&session(&["x"]), &[]).is_ok());
    }
}
