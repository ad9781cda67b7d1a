//! Catalog products.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as listed by the backend.
///
/// Products are read-only on the client: they are fetched and displayed,
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Backend document id.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in rupees.
    pub price: Price,
}

impl Product {
    /// Create a product.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}
