//! Stock and product lookups against the catalog API.
//!
//! # Endpoints
//!
//! - `GET {api_url}/stock/{id}` - `{ "id": 1, "amount": 3 }`
//! - `GET {api_url}/products/{id}` - `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! The store only talks to [`CatalogApi`]; [`HttpCatalogClient`] is the
//! production implementation. Products are cached, stock never is.

mod client;

pub use client::HttpCatalogClient;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body did not decode.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client could not be built from its configuration.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Read-only view of the catalog the cart validates against.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Current stock level for a product. Always a fresh read.
    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError>;

    /// Full product payload, or `None` if the catalog has no such product.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, ApiError>;
}
