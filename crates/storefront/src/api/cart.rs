//! Cart endpoints.

use bazaar_core::{Cart, QuantityChange};
use reqwest::Method;
use tracing::instrument;

use super::{Acknowledgement, ApiClient, ApiError};

impl ApiClient {
    /// Fetch the current cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not a cart.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, ApiError> {
        let request = self.request(Method::GET, "cart")?;
        self.send_json(request).await
    }

    /// Create or update the cart line for a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(product_id = %change.product_id, quantity = change.quantity))]
    pub async fn upsert_cart_line(
        &self,
        change: &QuantityChange,
    ) -> Result<Acknowledgement, ApiError> {
        let request = self.request(Method::POST, "cart")?.json(change);
        self.send_ack(request).await
    }

    /// Mark the current cart as checked out.
    ///
    /// The request carries no body; the backend knows which cart is current.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn update_cart_status(&self) -> Result<Acknowledgement, ApiError> {
        let request = self.request(Method::PUT, "cart")?;
        self.send_ack(request).await
    }
}
