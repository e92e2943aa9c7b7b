use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{redirect, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ApiError, CatalogApi};
use crate::model::{Product, ProductId, ProductPayload};
use crate::query::ListQuery;

const PRODUCTS_PATH: &str = "/api/products";

/// `CatalogApi` over HTTP with reqwest.
#[derive(Clone, Debug)]
pub struct HttpCatalog {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpCatalog {
    /// `timeout_seconds == 0` leaves requests without a timeout.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, ApiError> {
        let base = base_url.trim().trim_end_matches('/');
        let parsed = reqwest::Url::parse(base).map_err(|_| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("catalog-admin/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::limited(10));
        if timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_seconds));
        }
        let client = builder
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;

        Ok(Self {
            client,
            endpoint: format!("{base}{PRODUCTS_PATH}"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn item_url(&self, id: &ProductId) -> String {
        format!("{}/{}", self.endpoint, urlencoding::encode(id.as_str()))
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "catalog response");
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            warn!(%url, status = status.as_u16(), ?message, "catalog request rejected");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        what: &'static str,
    ) -> Result<T, ApiError> {
        let body = self.execute(request, url).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            what,
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Product>, ApiError> {
        let url = format!("{}?{}", self.endpoint, query.to_query_string());
        debug!(%url, "listing products");
        self.fetch(self.client.get(&url), &url, "product list").await
    }

    async fn get(&self, id: &ProductId) -> Result<Product, ApiError> {
        let url = self.item_url(id);
        debug!(%url, "fetching product");
        self.fetch(self.client.get(&url), &url, "product").await
    }

    async fn create(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
        let url = self.endpoint.clone();
        debug!(%url, name = %payload.name, "creating product");
        self.fetch(self.client.post(&url).json(payload), &url, "created product").await
    }

    async fn update(&self, id: &ProductId, payload: &ProductPayload) -> Result<Product, ApiError> {
        let url = self.item_url(id);
        debug!(%url, "updating product");
        self.fetch(self.client.put(&url).json(payload), &url, "updated product").await
    }

    async fn delete(&self, id: &ProductId) -> Result<(), ApiError> {
        let url = self.item_url(id);
        debug!(%url, "deleting product");
        self.execute(self.client.delete(&url), &url).await?;
        Ok(())
    }
}
