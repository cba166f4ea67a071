//! Stock level reported by the stock API.

use serde::{Deserialize, Serialize};

use super::ProductId;

/// Units of a product currently available.
///
/// Always fetched fresh before a quantity change; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product ID.
    pub id: ProductId,
    /// Units available.
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be served from this stock level.
    #[must_use]
    pub fn covers(&self, requested: u64) -> bool {
        requested <= u64::from(self.amount)
    }
}
