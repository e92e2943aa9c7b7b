pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Product, ProductId, ProductPayload};
use crate::query::ListQuery;

pub use http::HttpCatalog;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode {what} from {url}: {source}")]
    Decode {
        what: &'static str,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("server rejected request ({status}): {}", .message.as_deref().unwrap_or("no error message"))]
    Rejected { status: u16, message: Option<String> },
}

impl ApiError {
    /// The `error` field of a rejected request's JSON body, if the server
    /// sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }
}

/// The product REST API as seen by the admin console.
#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Product>, ApiError>;

    async fn get(&self, id: &ProductId) -> Result<Product, ApiError>;

    async fn create(&self, payload: &ProductPayload) -> Result<Product, ApiError>;

    async fn update(&self, id: &ProductId, payload: &ProductPayload) -> Result<Product, ApiError>;

    async fn delete(&self, id: &ProductId) -> Result<(), ApiError>;
}
