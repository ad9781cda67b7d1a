//! The shopper's cart and the quantity rule applied before every mutation.
//!
//! The backend returns cart lines with the product populated in place, so a
//! [`CartItem`] carries a full product snapshot under the wire field
//! `productId`. A cart holds at most one line per product. Lines whose
//! product has since been deleted come back with a null `productId`; they
//! are dropped when the cart is decoded.

use serde::{Deserialize, Deserializer, Serialize};

use super::{CartId, Price, Product, ProductId};

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Denormalized product snapshot.
    #[serde(rename = "productId")]
    pub product: Product,
    /// Number of units; the backend may keep a line at zero.
    pub quantity: u32,
    /// Cart document this line belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<CartId>,
}

impl CartItem {
    /// Create a cart line.
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self {
            product,
            quantity,
            cart_id: None,
        }
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    /// Whether the decrement control should be enabled for this line.
    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.quantity >= 1
    }
}

/// The upsert submitted for a cart line: the product and its new quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityChange {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The current cart, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

/// A cart line as it arrives, before lines without a product are dropped.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCartItem {
    #[serde(rename = "productId")]
    product: Option<Product>,
    quantity: u32,
    #[serde(default)]
    cart_id: Option<CartId>,
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let lines = Vec::<WireCartItem>::deserialize(deserializer)?;
        Ok(lines
            .into_iter()
            .filter_map(|line| {
                Some(CartItem {
                    product: line.product?,
                    quantity: line.quantity,
                    cart_id: line.cart_id,
                })
            })
            .collect())
    }
}

impl Cart {
    /// Create a cart from its lines.
    #[must_use]
    pub const fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// All lines, in backend order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product, if any.
    #[must_use]
    pub fn find(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.id == product_id)
    }

    /// Cart total: the sum of every line's price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// The cart document id, taken from the first line that carries one.
    #[must_use]
    pub fn cart_id(&self) -> Option<&CartId> {
        self.items.iter().find_map(|item| item.cart_id.as_ref())
    }

    /// Compute the upsert for adding or removing one unit of a product.
    ///
    /// An existing line moves by one in the requested direction; a product
    /// not yet in the cart always starts at 1, whatever `decrement` says.
    /// Decrementing a line at 1 yields 0 and is not clamped; decrementing a
    /// line already at 0 stays at 0.
    #[must_use]
    pub fn quantity_change(&self, product_id: &ProductId, decrement: bool) -> QuantityChange {
        let quantity = match self.find(product_id) {
            Some(item) if decrement => item.quantity.saturating_sub(1),
            Some(item) => item.quantity.saturating_add(1),
            None => 1,
        };

        QuantityChange {
            product_id: product_id.clone(),
            quantity,
        }
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
