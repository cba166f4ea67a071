//! The cart: an ordered list of products with quantities.
//!
//! A [`Cart`] holds at most one [`CartEntry`] per [`ProductId`] and every entry
//! has a positive amount. Both rules are checked when a cart is deserialized,
//! so a cart restored from storage is either valid or rejected outright.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use super::{Price, Product, ProductId};

/// Key under which an entry's quantity is serialized.
const AMOUNT_KEY: &str = "amount";

/// A violated cart invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
    #[error("product {0} has an amount of zero")]
    ZeroAmount(ProductId),
}

/// A product in the cart together with its quantity.
///
/// Serialized flat: the product's fields followed by `amount`. A catalog
/// attribute named `amount` is dropped from the product when the entry enters
/// a cart, since the cart quantity owns that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Product payload, stored as fetched from the catalog.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity in the cart (always at least 1).
    pub amount: u32,
}

impl CartEntry {
    /// Create a new entry with an amount of 1.
    #[must_use]
    pub fn first(product: Product) -> Self {
        Self { product, amount: 1 }.without_shadowed_amount()
    }

    /// Drop an `amount` attribute from the product payload.
    fn without_shadowed_amount(mut self) -> Self {
        self.product.extra.remove(AMOUNT_KEY);
        self
    }

    /// Product ID of this entry.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.product.price.times(self.amount)
    }
}

/// Ordered cart contents. Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a cart from entries, checking invariants.
    ///
    /// # Errors
    ///
    /// Returns `CartInvariantError` if two entries share a product ID or an
    /// entry has an amount of zero.
    pub fn from_entries(entries: Vec<CartEntry>) -> Result<Self, CartInvariantError> {
        let entries: Vec<CartEntry> = entries
            .into_iter()
            .map(CartEntry::without_shadowed_amount)
            .collect();
        for (i, entry) in entries.iter().enumerate() {
            if entry.amount == 0 {
                return Err(CartInvariantError::ZeroAmount(entry.id()));
            }
            if entries.iter().skip(i + 1).any(|other| other.id() == entry.id()) {
                return Err(CartInvariantError::DuplicateProduct(entry.id()));
            }
        }
        Ok(Self { entries })
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry for a product.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Find the entry for a product, mutably.
    pub fn find_mut(&mut self, id: ProductId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// Append a new entry at the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartInvariantError` if the product is already in the cart or
    /// the entry has an amount of zero.
    pub fn push(&mut self, entry: CartEntry) -> Result<(), CartInvariantError> {
        if entry.amount == 0 {
            return Err(CartInvariantError::ZeroAmount(entry.id()));
        }
        if self.find(entry.id()).is_some() {
            return Err(CartInvariantError::DuplicateProduct(entry.id()));
        }
        self.entries.push(entry.without_shadowed_amount());
        Ok(())
    }

    /// Remove the entry for a product, returning it if it was present.
    pub fn remove(&mut self, id: ProductId) -> Option<CartEntry> {
        let index = self.entries.iter().position(|e| e.id() == id)?;
        Some(self.entries.remove(index))
    }

    /// Sum of all amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.amount)).sum()
    }

    /// Sum of all line prices.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.entries.iter().map(CartEntry::line_price).sum()
    }
}

impl TryFrom<Vec<CartEntry>> for Cart {
    type Error = CartInvariantError;

    fn try_from(entries: Vec<CartEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Shoe {id}"),
            Price::from_cents(cents),
            format!("https://example.com/{id}.jpg"),
        )
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = CartEntry {
            product: product(1, 17990),
            amount: 2,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["amount"], 2);
        assert_eq!(value["title"], "Shoe 1");
        assert!(value.get("product").is_none());

        let back: CartEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
        assert!(back.product.extra.is_empty());
    }

    #[test]
    fn test_push_rejects_duplicates() {
        let mut cart = Cart::new();
        cart.push(CartEntry::first(product(1, 100))).unwrap();
        let err = cart.push(CartEntry::first(product(1, 100))).unwrap_err();
        assert_eq!(err, CartInvariantError::DuplicateProduct(ProductId::new(1)));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut cart = Cart::new();
        for id in [3, 1, 2] {
            cart.push(CartEntry::first(product(id, 100))).unwrap();
        }
        let ids: Vec<i32> = cart.entries().iter().map(|e| e.id().as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.push(CartEntry::first(product(1, 100))).unwrap();
        assert!(cart.remove(ProductId::new(1)).is_some());
        assert!(cart.remove(ProductId::new(1)).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_duplicate_ids() {
        let json = r#"[
            {"id": 1, "title": "a", "price": 1, "image": "", "amount": 1},
            {"id": 1, "title": "a", "price": 1, "image": "", "amount": 2}
        ]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_zero_amount() {
        let json = r#"[{"id": 1, "title": "a", "price": 1, "image": "", "amount": 0}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_cart_round_trips_as_array() {
        let mut cart = Cart::new();
        cart.push(CartEntry::first(product(1, 100))).unwrap();
        cart.push(CartEntry {
            product: product(2, 250),
            amount: 3,
        })
        .unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_catalog_amount_attribute_does_not_break_round_trip() {
        let product: Product = serde_json::from_str(
            r#"{"id": 1, "title": "a", "price": 1, "image": "", "amount": 7, "color": "red"}"#,
        )
        .unwrap();
        assert_eq!(product.extra.get("amount"), Some(&serde_json::Value::from(7)));

        let mut cart = Cart::new();
        cart.push(CartEntry::first(product.clone())).unwrap();
        cart.push(CartEntry {
            product: Product {
                id: ProductId::new(2),
                ..product
            },
            amount: 4,
        })
        .unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(json.matches("\"amount\"").count(), 2);

        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
        assert_eq!(back.entries()[0].amount, 1);
        assert_eq!(back.entries()[1].amount, 4);
        assert_eq!(back.entries()[0].product.extra.get("color"), Some(&serde_json::Value::from("red")));
        assert!(back.entries()[0].product.extra.get("amount").is_none());
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.push(CartEntry {
            product: product(1, 1000),
            amount: 2,
        })
        .unwrap();
        cart.push(CartEntry::first(product(2, 550))).unwrap();

        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(2550));
        assert_eq!(Cart::new().subtotal(), Price::ZERO);
    }
}
