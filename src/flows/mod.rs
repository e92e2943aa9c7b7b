//! Create, edit and delete flows for single products. Each reports to the
//! `View` and refreshes the list through the shared `Coordinator`.

pub mod create;
pub mod delete;
pub mod edit;

use crate::api::ApiError;
use crate::model::{Product, ValidationError};

pub use create::CreateFlow;
pub use delete::{Confirm, DeleteFlow, DeleteOutcome};
pub use edit::{EditDialog, EditFlow, OpenOutcome};

/// Result of submitting an add or edit form.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    /// A client-side rule failed; nothing was sent.
    Invalid(ValidationError),
    /// The request was sent and failed; carries the message shown.
    Rejected(String),
    /// The server accepted the change.
    Saved(Product),
}

impl Submission {
    pub fn is_saved(&self) -> bool {
        matches!(self, Submission::Saved(_))
    }
}

/// The server's own message when it sent one, otherwise `fallback`. A
/// transport or decode failure appends its cause to the fallback.
fn failure_message(error: &ApiError, fallback: &str) -> String {
    match error {
        ApiError::Rejected { .. } => error
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string()),
        other => format!("{fallback}: {other}"),
    }
}
