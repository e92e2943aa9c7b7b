use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::{ApiError, CatalogApi};
use crate::debounce::Debouncer;
use crate::flows::{
    Confirm, CreateFlow, DeleteFlow, DeleteOutcome, EditDialog, EditFlow, OpenOutcome, Submission,
};
use crate::model::{FormField, ProductForm, ProductId};
use crate::output::{report, ListView};
use crate::query::{Coordinator, QueryInput, QueryInputs, SortKey};
use crate::view::View;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Clone, Debug)]
pub struct Options {
    /// Quiet period after the last change to a list input before the list
    /// is fetched again.
    pub debounce: Duration,
    pub inputs: QueryInputs,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            inputs: QueryInputs::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("failed to load products: {source}")]
    Load {
        #[source]
        source: ApiError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The admin page: the product list with its three inputs, the add form,
/// the edit dialog, and delete actions.
pub struct Console<A, V> {
    coordinator: Coordinator<A, V>,
    create: CreateFlow<A, V>,
    edit: EditFlow<A, V>,
    delete: DeleteFlow<A, V>,
    search_timer: Debouncer,
    category_timer: Debouncer,
    sort_timer: Debouncer,
}

impl<A: CatalogApi, V: View> Console<A, V> {
    pub fn new(api: A, view: V, options: Options) -> Self {
        let coordinator = Coordinator::new(
            Arc::new(api),
            Arc::new(Mutex::new(view)),
            options.inputs,
        );
        let timer = |input: QueryInput| {
            let c = coordinator.clone();
            Debouncer::new(options.debounce, move || {
                let c = c.clone();
                async move {
                    debug!(?input, "debounced refresh");
                    let _ = c.refresh().await;
                }
            })
        };

        Self {
            search_timer: timer(QueryInput::Search),
            category_timer: timer(QueryInput::Category),
            sort_timer: timer(QueryInput::Sort),
            create: CreateFlow::new(coordinator.clone()),
            edit: EditFlow::new(coordinator.clone()),
            delete: DeleteFlow::new(coordinator.clone()),
            coordinator,
        }
    }

    pub fn coordinator(&self) -> &Coordinator<A, V> {
        &self.coordinator
    }

    pub fn view(&self) -> &Arc<Mutex<V>> {
        self.coordinator.view()
    }

    pub fn debounce(&self) -> Duration {
        self.search_timer.delay()
    }

    /// Initial load.
    pub async fn start(&self) -> Result<usize, ApiError> {
        self.coordinator.refresh().await
    }

    pub async fn refresh(&self) -> Result<usize, ApiError> {
        self.coordinator.refresh().await
    }

    pub async fn set_search(&self, value: impl Into<String>) {
        self.coordinator.set_search(value).await;
        self.search_timer.call();
    }

    pub async fn set_category(&self, value: impl Into<String>) {
        self.coordinator.set_category(value).await;
        self.category_timer.call();
    }

    pub async fn set_sort(&self, sort: SortKey) {
        self.coordinator.set_sort(sort).await;
        self.sort_timer.call();
    }

    /// Fills the given add-form fields, then submits the whole draft.
    pub async fn add(&self, fields: Vec<(FormField, String)>) -> Submission {
        for (field, value) in fields {
            self.create.set_field(field, value).await;
        }
        self.create.submit().await
    }

    pub async fn add_draft(&self) -> ProductForm {
        self.create.draft().await
    }

    pub async fn edit(&self, id: &ProductId) -> OpenOutcome {
        self.edit.open(id).await
    }

    /// Edits fields of the open dialog; false when none is open.
    pub async fn set(&self, fields: Vec<(FormField, String)>) -> bool {
        let mut applied = true;
        for (field, value) in fields {
            applied &= self.edit.set_field(field, value).await;
        }
        applied
    }

    pub async fn save(&self) -> Option<Submission> {
        self.edit.save().await
    }

    pub async fn cancel(&self) -> bool {
        self.edit.cancel().await
    }

    pub async fn edit_state(&self) -> EditDialog {
        self.edit.state().await
    }

    pub async fn delete<C: Confirm + ?Sized>(
        &self,
        id: &ProductId,
        confirm: &mut C,
    ) -> DeleteOutcome {
        self.delete.delete(id, confirm).await
    }

    /// A freshly fetched list for the current inputs; the view is not
    /// touched.
    pub async fn snapshot(&self) -> Result<ListView, ApiError> {
        self.coordinator.load().await
    }

    /// Writes the current list as an HTML page and returns the row count.
    pub async fn export_html(&self, path: &Path) -> Result<usize, ConsoleError> {
        let list = self
            .snapshot()
            .await
            .map_err(|source| ConsoleError::Load { source })?;
        tokio::fs::write(path, report::render_page(&list))
            .await
            .map_err(|source| ConsoleError::Write {
                path: path.display().to_string(),
                source,
            })?;
        Ok(list.table.rows.len())
    }
}
