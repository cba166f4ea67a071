//! The cart store.
//!
//! [`CartStore`] owns the in-memory cart and is the only writer of its
//! storage slot. Each mutation works on a copy of the cart, checks stock
//! against the catalog, and commits only once every check has passed: the
//! slot is written first, then the in-memory cart is replaced. A failed
//! operation leaves both untouched.
//!
//! Mutations take `&mut self`, so two operations on one store can never
//! interleave across an `.await`.
//!
//! # Example
//!
//! ```rust,ignore
//! let catalog = HttpCatalogClient::new(&config.api)?;
//! let storage = FileStorage::from_config(&config.storage);
//! let mut store = CartStore::open(catalog, storage).await?;
//!
//! if let Err(err) = store.add_product(ProductId::new(1)).await {
//!     eprintln!("{}", Notice::for_error(CartOperation::Add, &err));
//! }
//! ```

use rocketshoes_core::{Cart, CartEntry, ProductId};
use tracing::{debug, instrument, warn};

use crate::catalog::CatalogApi;
use crate::error::{CartError, Result};
use crate::storage::{CartStorage, StorageError};

/// Arguments for [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Requested quantity. Values below 1 are ignored.
    pub amount: i64,
}

/// What the store found in its storage slot when it opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreStatus {
    /// Nothing stored yet; started with an empty cart.
    Empty,
    /// Cart restored from storage.
    Restored { entries: usize },
    /// Stored data could not be used; started with an empty cart.
    ///
    /// The slot is left as it was until the next successful mutation.
    Reset { reason: String },
}

/// Cart state manager.
pub struct CartStore<C, S> {
    catalog: C,
    storage: S,
    cart: Cart,
    restore_status: RestoreStatus,
}

impl<C, S> std::fmt::Debug for CartStore<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("restore_status", &self.restore_status)
            .finish_non_exhaustive()
    }
}

impl<C: CatalogApi, S: CartStorage> CartStore<C, S> {
    /// Open a store, restoring the cart from `storage`.
    ///
    /// A missing slot gives an empty cart. A slot that does not decode into a
    /// valid cart also gives an empty cart, reported as
    /// [`RestoreStatus::Reset`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage could not be read at all.
    pub async fn open(catalog: C, storage: S) -> std::result::Result<Self, StorageError> {
        let (cart, restore_status) = match storage.load().await {
            Ok(None) => (Cart::new(), RestoreStatus::Empty),
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => {
                    let entries = cart.len();
                    (cart, RestoreStatus::Restored { entries })
                }
                Err(e) => reset(e.to_string()),
            },
            Err(StorageError::Malformed(reason)) => reset(reason),
            Err(e) => return Err(e),
        };

        debug!(status = ?restore_status, "Cart store opened");

        Ok(Self {
            catalog,
            storage,
            cart,
            restore_status,
        })
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// What was found in storage when the store opened.
    #[must_use]
    pub const fn restore_status(&self) -> &RestoreStatus {
        &self.restore_status
    }

    /// Add one unit of a product.
    ///
    /// Appends a new entry with amount 1, or increments an existing one.
    ///
    /// # Errors
    ///
    /// - `OutOfStock` if there is no stock, or not enough for one more unit
    /// - `ProductNotFound` if the catalog has no such product, or answers
    ///   with a product under a different ID
    /// - `Api` / `Storage` if a catalog call or the storage write fails
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<()> {
        let stock = self.catalog.stock(product_id).await?;

        let mut working = self.cart.clone();
        let requested = working
            .find(product_id)
            .map_or(1, |entry| u64::from(entry.amount) + 1);

        if stock.amount == 0 || !stock.covers(requested) {
            warn!(requested, available = stock.amount, "Add rejected: out of stock");
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        if let Some(entry) = working.find_mut(product_id) {
            // requested <= stock.amount, so this fits in u32
            entry.amount += 1;
        } else {
            let product = self
                .catalog
                .product(product_id)
                .await?
                .ok_or(CartError::ProductNotFound(product_id))?;
            if product.id != product_id {
                warn!(returned = %product.id, "Add rejected: catalog returned another product");
                return Err(CartError::ProductNotFound(product_id));
            }
            working.push(CartEntry::first(product))?;
        }

        self.commit(working).await
    }

    /// Remove a product from the cart entirely.
    ///
    /// # Errors
    ///
    /// - `NotInCart` if the product is not in the cart
    /// - `Storage` if the storage write fails
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&mut self, product_id: ProductId) -> Result<()> {
        let mut working = self.cart.clone();

        if working.remove(product_id).is_none() {
            warn!("Remove rejected: product not in cart");
            return Err(CartError::NotInCart(product_id));
        }

        self.commit(working).await
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// An amount below 1 is ignored and returns `Ok(())` without touching
    /// the cart or the catalog.
    ///
    /// # Errors
    ///
    /// - `NotInCart` if the product is not in the cart
    /// - `OutOfStock` if the amount exceeds the current stock
    /// - `Api` / `Storage` if the stock lookup or the storage write fails
    #[instrument(skip(self, request), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&mut self, request: UpdateProductAmount) -> Result<()> {
        let UpdateProductAmount { product_id, amount } = request;

        if amount < 1 {
            debug!("Ignoring update to non-positive amount");
            return Ok(());
        }

        let mut working = self.cart.clone();
        if working.find(product_id).is_none() {
            warn!("Update rejected: product not in cart");
            return Err(CartError::NotInCart(product_id));
        }

        let stock = self.catalog.stock(product_id).await?;

        let new_amount = u32::try_from(amount)
            .ok()
            .filter(|requested| *requested <= stock.amount);
        let Some(new_amount) = new_amount else {
            warn!(available = stock.amount, "Update rejected: out of stock");
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount.unsigned_abs(),
                available: stock.amount,
            });
        };
        let entry = working
            .find_mut(product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        entry.amount = new_amount;

        self.commit(working).await
    }

    /// Write `working` to storage in full, then make it the current cart.
    async fn commit(&mut self, working: Cart) -> Result<()> {
        let serialized = serde_json::to_string(&working).map_err(StorageError::Serialize)?;
        self.storage.save(&serialized).await?;
        self.cart = working;

        debug!(
            entries = self.cart.len(),
            total_quantity = self.cart.total_quantity(),
            "Cart committed"
        );
        Ok(())
    }
}

fn reset(reason: String) -> (Cart, RestoreStatus) {
    warn!(%reason, "Stored cart is unreadable, starting with an empty cart");
    (Cart::new(), RestoreStatus::Reset { reason })
}
