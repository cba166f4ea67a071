//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! rs-cart show
//! rs-cart add 1
//! rs-cart update 1 3
//! rs-cart remove 1
//! ```

use std::io::{self, Write};

use rocketshoes_cart::{
    CartError, CartOperation, CartStorage, CartStore, CatalogApi, ErrorCategory, Notice,
    UpdateProductAmount,
};
use rocketshoes_core::{Cart, ProductId};
use thiserror::Error;

/// A cart operation that failed, with the notice to show the user.
#[derive(Debug, Error)]
#[error("{notice}")]
pub struct OperationFailed {
    pub notice: Notice,
    #[source]
    pub source: CartError,
}

impl OperationFailed {
    fn new(operation: CartOperation, source: CartError) -> Self {
        Self {
            notice: Notice::for_error(operation, &source),
            source,
        }
    }

    /// Whether the failure is worth reporting to error tracking.
    ///
    /// Out-of-stock and not-in-cart are ordinary user outcomes.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(self.notice.category, ErrorCategory::Failure)
    }
}

/// Add one unit of a product.
pub async fn add<C: CatalogApi, S: CartStorage>(
    store: &mut CartStore<C, S>,
    product_id: ProductId,
) -> Result<(), OperationFailed> {
    store
        .add_product(product_id)
        .await
        .map_err(|e| OperationFailed::new(CartOperation::Add, e))?;
    tracing::info!(%product_id, "Product added");
    Ok(())
}

/// Remove a product.
pub async fn remove<C: CatalogApi, S: CartStorage>(
    store: &mut CartStore<C, S>,
    product_id: ProductId,
) -> Result<(), OperationFailed> {
    store
        .remove_product(product_id)
        .await
        .map_err(|e| OperationFailed::new(CartOperation::Remove, e))?;
    tracing::info!(%product_id, "Product removed");
    Ok(())
}

/// Set the amount of a product.
pub async fn update<C: CatalogApi, S: CartStorage>(
    store: &mut CartStore<C, S>,
    product_id: ProductId,
    amount: i64,
) -> Result<(), OperationFailed> {
    store
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await
        .map_err(|e| OperationFailed::new(CartOperation::UpdateAmount, e))?;
    tracing::info!(%product_id, amount, "Product amount updated");
    Ok(())
}

/// Write the cart as a plain text table.
///
/// # Errors
///
/// Returns `io::Error` if `out` cannot be written.
pub fn show(cart: &Cart, out: &mut impl Write) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    for entry in cart.entries() {
        writeln!(
            out,
            "{:>4}  {:<50}  {:>3} x {:>10}  {:>10}",
            entry.id().as_i32(),
            entry.product.title,
            entry.amount,
            entry.product.price.to_string(),
            entry.line_price().to_string(),
        )?;
    }
    writeln!(
        out,
        "{} item(s), subtotal {}",
        cart.total_quantity(),
        cart.subtotal()
    )
}
