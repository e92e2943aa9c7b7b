use async_trait::async_trait;
use tracing::{info, warn};

use crate::api::CatalogApi;
use crate::model::ProductId;
use crate::query::Coordinator;
use crate::view::View;

pub const DELETE_PROMPT: &str = "Delete this product?";

/// Asks the user a yes/no question.
#[async_trait]
pub trait Confirm: Send {
    async fn confirm(&mut self, prompt: &str) -> bool;
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeleteOutcome {
    Declined,
    Deleted,
    Failed(String),
}

pub struct DeleteFlow<A, V> {
    coordinator: Coordinator<A, V>,
}

impl<A: CatalogApi, V: View> DeleteFlow<A, V> {
    pub fn new(coordinator: Coordinator<A, V>) -> Self {
        Self { coordinator }
    }

    pub async fn delete<C: Confirm + ?Sized>(
        &self,
        id: &ProductId,
        confirm: &mut C,
    ) -> DeleteOutcome {
        if !confirm.confirm(DELETE_PROMPT).await {
            return DeleteOutcome::Declined;
        }

        match self.coordinator.api().delete(id).await {
            Ok(()) => {
                info!(%id, "product deleted");
                let _ = self.coordinator.refresh().await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!(%id, error = %e, "delete product failed");
                let message = match e.server_message() {
                    Some(m) => format!("Could not delete product {id}: {m}"),
                    None if e.is_not_found() => format!("Product {id} not found"),
                    None => format!("Could not delete product {id}: {e}"),
                };
                self.coordinator.view().lock().await.show_error(&message);
                DeleteOutcome::Failed(message)
            }
        }
    }
}
