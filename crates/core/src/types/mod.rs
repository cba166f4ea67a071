//! Core types for Rocket Shoes.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod stock;

pub use cart::{Cart, CartEntry, CartInvariantError};
pub use id::*;
pub use price::Price;
pub use product::Product;
pub use stock::Stock;
