//! Product catalog endpoints.

use bazaar_core::Product;
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "products")?;
        self.send_json(request).await
    }

    /// Search products by name.
    ///
    /// The query is sent as given (callers trim it); an empty query is still
    /// sent to the search endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint("products/search")?;
        url.query_pairs_mut().append_pair("query", query);

        let request = self.inner.client.request(Method::GET, url);
        self.send_json(request).await
    }
}
