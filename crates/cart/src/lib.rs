//! Rocket Shoes Cart - stock-checked cart state mirrored to durable storage.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart and is constructed once per session
//! - [`CatalogApi`] is the stock/product lookup seam; [`HttpCatalogClient`]
//!   talks to the REST API with `reqwest` and caches products via `moka`
//! - [`CartStorage`] is the durable slot seam; [`FileStorage`] and
//!   [`MemoryStorage`] implement it
//!
//! Operations return `Result<(), CartError>`. Turning a failure into
//! something the user sees is the caller's job, via [`Notice::for_error`].
//!
//! # Modules
//!
//! - [`catalog`] - Stock and product lookups
//! - [`config`] - Environment configuration
//! - [`error`] - Cart errors and user-facing notices
//! - [`storage`] - Durable storage slot
//! - [`store`] - The cart store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;

pub use catalog::{ApiError, CatalogApi, HttpCatalogClient};
pub use config::{ApiConfig, CartConfig, ConfigError, StorageConfig};
pub use error::{CartError, CartOperation, ErrorCategory, Notice};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, RestoreStatus, UpdateProductAmount};
