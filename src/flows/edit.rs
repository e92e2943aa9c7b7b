use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{failure_message, Submission};
use crate::api::CatalogApi;
use crate::model::{FormField, ProductForm, ProductId};
use crate::query::Coordinator;
use crate::view::View;

const UPDATE_FAILED: &str = "Update failed";

/// The edit dialog. `Open` holds the working copy of one product; there is
/// never more than one.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EditDialog {
    #[default]
    Closed,
    Open { id: ProductId, form: ProductForm },
}

impl EditDialog {
    pub fn is_open(&self) -> bool {
        matches!(self, EditDialog::Open { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OpenOutcome {
    Opened,
    /// The product could not be loaded; the dialog state is unchanged.
    Failed(String),
}

pub struct EditFlow<A, V> {
    coordinator: Coordinator<A, V>,
    dialog: Mutex<EditDialog>,
}

impl<A: CatalogApi, V: View> EditFlow<A, V> {
    pub fn new(coordinator: Coordinator<A, V>) -> Self {
        Self {
            coordinator,
            dialog: Mutex::new(EditDialog::Closed),
        }
    }

    pub async fn state(&self) -> EditDialog {
        self.dialog.lock().await.clone()
    }

    /// Loads `id` and opens the dialog with its fields, replacing any copy
    /// that was already open.
    pub async fn open(&self, id: &ProductId) -> OpenOutcome {
        let product = match self.coordinator.api().get(id).await {
            Ok(p) => p,
            Err(e) => {
                warn!(%id, error = %e, "could not load product for editing");
                let message = if e.is_not_found() {
                    format!("Product {id} not found")
                } else {
                    format!("Could not load product {id}: {e}")
                };
                self.coordinator.view().lock().await.show_error(&message);
                return OpenOutcome::Failed(message);
            }
        };

        let form = ProductForm::from_product(&product);
        *self.dialog.lock().await = EditDialog::Open {
            id: product.id.clone(),
            form: form.clone(),
        };
        let mut view = self.coordinator.view().lock().await;
        view.show_edit_message("");
        view.open_edit_dialog(&product.id, &form);
        OpenOutcome::Opened
    }

    /// Edits the open copy. Returns false when no dialog is open.
    pub async fn set_field(&self, field: FormField, value: impl Into<String>) -> bool {
        match &mut *self.dialog.lock().await {
            EditDialog::Open { form, .. } => {
                form.set(field, value);
                true
            }
            EditDialog::Closed => false,
        }
    }

    /// Validates and submits the open copy. `None` when no dialog is open.
    /// The dialog stays open unless the server accepts the update.
    pub async fn save(&self) -> Option<Submission> {
        let (id, form) = match &*self.dialog.lock().await {
            EditDialog::Open { id, form } => (id.clone(), form.clone()),
            EditDialog::Closed => return None,
        };
        let view = self.coordinator.view();

        let payload = match form.validate() {
            Ok(p) => p,
            Err(e) => {
                view.lock().await.show_edit_message(&e.to_string());
                return Some(Submission::Invalid(e));
            }
        };

        let updated = match self.coordinator.api().update(&id, &payload).await {
            Ok(p) => p,
            Err(e) => {
                warn!(%id, error = %e, "update product failed");
                let message = failure_message(&e, UPDATE_FAILED);
                view.lock().await.show_edit_message(&message);
                return Some(Submission::Rejected(message));
            }
        };

        info!(%id, name = %updated.name, "product updated");
        {
            let mut dialog = self.dialog.lock().await;
            // another product may have been opened while the update was in flight
            if matches!(&*dialog, EditDialog::Open { id: open_id, .. } if *open_id == id) {
                *dialog = EditDialog::Closed;
                view.lock().await.close_edit_dialog();
            }
        }
        let _ = self.coordinator.refresh().await;
        Some(Submission::Saved(updated))
    }

    /// Discards the open copy without contacting the server.
    pub async fn cancel(&self) -> bool {
        let mut dialog = self.dialog.lock().await;
        if !dialog.is_open() {
            return false;
        }
        *dialog = EditDialog::Closed;
        self.coordinator.view().lock().await.close_edit_dialog();
        true
    }
}
