//! Cart operation errors and the user-facing notices derived from them.
//!
//! Every cart operation returns `Result<(), CartError>`. Nothing is shown to
//! the user from inside the store; callers turn a failure into a [`Notice`]
//! with [`Notice::for_error`] and decide how to display it.

use std::fmt;

use rocketshoes_core::{CartInvariantError, ProductId};
use thiserror::Error;

use crate::catalog::ApiError;
use crate::storage::StorageError;

/// Reasons a cart operation can fail.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds the available stock.
    #[error("Out of stock: product {product_id} requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Catalog returned no product for this ID.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Catalog API call failed.
    #[error("Catalog error: {0}")]
    Api(#[from] ApiError),

    /// Durable storage write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog data would break a cart invariant.
    #[error("Cart invariant violated: {0}")]
    Invariant(#[from] CartInvariantError),
}

/// Broad failure classes, as the user sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Quantity requested exceeds availability.
    OutOfStock,
    /// Target product absent from the cart.
    NotFound,
    /// Network, parse, storage, or missing-product failure.
    Failure,
}

impl CartError {
    /// Failure class of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::OutOfStock { .. } => ErrorCategory::OutOfStock,
            Self::NotInCart(_) => ErrorCategory::NotFound,
            Self::ProductNotFound(_) | Self::Api(_) | Self::Storage(_) | Self::Invariant(_) => {
                ErrorCategory::Failure
            }
        }
    }
}

/// The cart operation a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Failed to add product",
            Self::Remove => "Failed to remove product",
            Self::UpdateAmount => "Failed to change product amount",
        }
    }
}

const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// A user-facing failure message.
///
/// Transient and permanent failures read the same; the underlying
/// [`CartError`] stays available to the caller for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    /// Operation that failed.
    pub operation: CartOperation,
    /// Failure class.
    pub category: ErrorCategory,
    message: &'static str,
}

impl Notice {
    /// Derive the notice for a failed operation.
    #[must_use]
    pub const fn for_error(operation: CartOperation, error: &CartError) -> Self {
        let category = error.category();
        let message = match category {
            ErrorCategory::OutOfStock => OUT_OF_STOCK_MESSAGE,
            ErrorCategory::NotFound | ErrorCategory::Failure => operation.failure_message(),
        };
        Self {
            operation,
            category,
            message,
        }
    }

    /// Message text.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn out_of_stock() -> CartError {
        CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        }
    }

    #[test]
    fn test_cart_error_display() {
        assert_eq!(
            out_of_stock().to_string(),
            "Out of stock: product 1 requested 3, available 2"
        );
        assert_eq!(
            CartError::NotInCart(ProductId::new(4)).to_string(),
            "Product 4 is not in the cart"
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(out_of_stock().category(), ErrorCategory::OutOfStock);
        assert_eq!(
            CartError::NotInCart(ProductId::new(1)).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            CartError::ProductNotFound(ProductId::new(1)).category(),
            ErrorCategory::Failure
        );
        assert_eq!(
            CartError::Api(ApiError::NotFound("stock/1".to_string())).category(),
            ErrorCategory::Failure
        );
    }

    #[test]
    fn test_out_of_stock_notice_is_shared_by_add_and_update() {
        let err = out_of_stock();
        assert_eq!(
            Notice::for_error(CartOperation::Add, &err).message(),
            "Requested quantity is out of stock"
        );
        assert_eq!(
            Notice::for_error(CartOperation::UpdateAmount, &err).message(),
            "Requested quantity is out of stock"
        );
    }

    #[test]
    fn test_failure_notices_name_the_operation() {
        let err = CartError::ProductNotFound(ProductId::new(9));
        assert_eq!(
            Notice::for_error(CartOperation::Add, &err).to_string(),
            "Failed to add product"
        );

        let err = CartError::NotInCart(ProductId::new(9));
        assert_eq!(
            Notice::for_error(CartOperation::Remove, &err).to_string(),
            "Failed to remove product"
        );
        assert_eq!(
            Notice::for_error(CartOperation::UpdateAmount, &err).to_string(),
            "Failed to change product amount"
        );
    }
}
