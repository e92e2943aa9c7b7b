use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{failure_message, Submission};
use crate::api::CatalogApi;
use crate::model::{FormField, ProductForm};
use crate::query::Coordinator;
use crate::view::View;

const CREATE_FAILED: &str = "Failed to add product";

/// The add-product form and its submission.
pub struct CreateFlow<A, V> {
    coordinator: Coordinator<A, V>,
    draft: Mutex<ProductForm>,
}

impl<A: CatalogApi, V: View> CreateFlow<A, V> {
    pub fn new(coordinator: Coordinator<A, V>) -> Self {
        Self {
            coordinator,
            draft: Mutex::new(ProductForm::default()),
        }
    }

    pub async fn draft(&self) -> ProductForm {
        self.draft.lock().await.clone()
    }

    pub async fn set_field(&self, field: FormField, value: impl Into<String>) {
        self.draft.lock().await.set(field, value);
    }

    /// Validates and posts the current draft. The draft survives a failed
    /// submission and is cleared only after the server accepts it.
    pub async fn submit(&self) -> Submission {
        let view = self.coordinator.view();
        view.lock().await.show_add_message("");

        let form = self.draft().await;
        let payload = match form.validate() {
            Ok(p) => p,
            Err(e) => {
                view.lock().await.show_add_message(&e.to_string());
                return Submission::Invalid(e);
            }
        };

        let created = match self.coordinator.api().create(&payload).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, name = %payload.name, "create product failed");
                let message = failure_message(&e, CREATE_FAILED);
                view.lock().await.show_add_message(&message);
                return Submission::Rejected(message);
            }
        };

        info!(id = %created.id, name = %created.name, "product created");
        *self.draft.lock().await = ProductForm::default();
        {
            let mut v = view.lock().await;
            v.reset_add_form();
            v.show_add_message(&format!("Added \"{}\" (ID {})", created.name, created.id));
        }
        // refresh failures are already reported to the view
        let _ = self.coordinator.refresh().await;
        Submission::Saved(created)
    }
}
