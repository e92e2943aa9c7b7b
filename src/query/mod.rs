use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::{ApiError, CatalogApi};
use crate::output::{self, ListView};
use crate::view::View;

/// Orderings understood by the products endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Newest,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "created_at_desc",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::NameAsc => "name_asc",
            SortKey::NameDesc => "name_desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Newest => "newest first",
            SortKey::PriceAsc => "price, low to high",
            SortKey::PriceDesc => "price, high to low",
            SortKey::NameAsc => "name, A to Z",
            SortKey::NameDesc => "name, Z to A",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return Ok(SortKey::default());
        }
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                let known = SortKey::ALL.map(SortKey::as_str).join(", ");
                format!("unknown sort key '{wanted}', expected one of: {known}")
            })
    }
}

/// The three list inputs, each of which gets its own debounce timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryInput {
    Search,
    Category,
    Sort,
}

/// Current raw values of the list inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryInputs {
    pub search: String,
    pub category: String,
    pub sort: SortKey,
}

/// One list request, built from the inputs at refresh time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub search: String,
    pub category: String,
    pub sort: SortKey,
}

impl ListQuery {
    pub fn from_inputs(inputs: &QueryInputs) -> Self {
        Self {
            search: inputs.search.trim().to_string(),
            category: inputs.category.trim().to_string(),
            sort: inputs.sort,
        }
    }

    /// `q=..&category=..&sort=..`, every value percent-encoded.
    pub fn to_query_string(&self) -> String {
        format!(
            "q={}&category={}&sort={}",
            urlencoding::encode(&self.search),
            urlencoding::encode(&self.category),
            urlencoding::encode(self.sort.as_str()),
        )
    }
}

/// Builds the list query from the current inputs, fetches, renders, and
/// pushes the result to the view.
pub struct Coordinator<A, V> {
    api: Arc<A>,
    view: Arc<Mutex<V>>,
    inputs: Arc<Mutex<QueryInputs>>,
}

impl<A, V> Clone for Coordinator<A, V> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            view: Arc::clone(&self.view),
            inputs: Arc::clone(&self.inputs),
        }
    }
}

impl<A: CatalogApi, V: View> Coordinator<A, V> {
    pub fn new(api: Arc<A>, view: Arc<Mutex<V>>, inputs: QueryInputs) -> Self {
        Self {
            api,
            view,
            inputs: Arc::new(Mutex::new(inputs)),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn view(&self) -> &Arc<Mutex<V>> {
        &self.view
    }

    pub async fn inputs(&self) -> QueryInputs {
        self.inputs.lock().await.clone()
    }

    pub async fn set_search(&self, value: impl Into<String>) {
        self.inputs.lock().await.search = value.into();
    }

    pub async fn set_category(&self, value: impl Into<String>) {
        self.inputs.lock().await.category = value.into();
    }

    pub async fn set_sort(&self, sort: SortKey) {
        self.inputs.lock().await.sort = sort;
    }

    /// Fetches and renders without touching the view.
    pub async fn load(&self) -> Result<ListView, ApiError> {
        let query = ListQuery::from_inputs(&*self.inputs.lock().await);
        let products = self.api.list(&query).await?;
        debug!(count = products.len(), sort = %query.sort, "products loaded");
        Ok(output::render_list(&query, &products))
    }

    /// Returns the number of rows shown. On failure the previous table is
    /// kept and the error is reported to the view.
    pub async fn refresh(&self) -> Result<usize, ApiError> {
        match self.load().await {
            Ok(list) => {
                let rows = list.table.rows.len();
                self.view.lock().await.render_list(&list);
                Ok(rows)
            }
            Err(e) => {
                warn!(error = %e, "product list refresh failed");
                self.view
                    .lock()
                    .await
                    .show_error(&format!("Failed to load products: {e}"));
                Err(e)
            }
        }
    }
}
