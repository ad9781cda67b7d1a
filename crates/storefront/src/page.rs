//! State and actions of the products page.
//!
//! [`ProductsPage`] owns everything the page shows: the product grid, the
//! search box, the cart, the checkout addresses, the checkout workflow and
//! the notification banner. Each method is one shopper action. Failures are
//! shown on the banner and also returned to the caller.

use bazaar_core::{Cart, Price, Product, ProductId};
use tracing::instrument;

use crate::api::StoreBackend;
use crate::checkout::{
    CheckoutReceipt, CheckoutState, CheckoutWorkflow, PendingPayment, ShippingDetails,
};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::notification::{Notification, Snackbar};

/// Banner text after a successful confirmation.
pub const ORDER_PLACED: &str = "Payment confirmed, order placed";

/// Banner text when the cart endpoint acknowledges without a message.
const CART_UPDATED: &str = "Cart updated";

/// Products page controller.
#[derive(Debug)]
pub struct ProductsPage<B> {
    backend: B,
    products: Vec<Product>,
    cart: Cart,
    search_query: String,
    shipping: ShippingDetails,
    checkout: CheckoutWorkflow,
    snackbar: Snackbar,
}

impl<B: StoreBackend> ProductsPage<B> {
    /// Create an empty page; call [`load`](Self::load) to populate it.
    #[must_use]
    pub fn new(backend: B, snackbar: Snackbar) -> Self {
        Self {
            backend,
            products: Vec::new(),
            cart: Cart::default(),
            search_query: String::new(),
            shipping: ShippingDetails::default(),
            checkout: CheckoutWorkflow::new(),
            snackbar,
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Products currently shown in the grid.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    #[must_use]
    pub const fn shipping(&self) -> &ShippingDetails {
        &self.shipping
    }

    #[must_use]
    pub const fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    /// The banner, for wiring page visibility changes.
    #[must_use]
    pub const fn snackbar(&self) -> &Snackbar {
        &self.snackbar
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product list and the cart.
    ///
    /// # Errors
    ///
    /// Returns the first failing request; the banner shows it.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        self.refresh_products().await?;
        self.refresh_cart().await
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Replace the grid with the products matching the search box.
    ///
    /// A blank query shows the unfiltered list.
    ///
    /// # Errors
    ///
    /// Returns the failed request; the grid is left unchanged.
    #[instrument(skip(self), fields(query = %self.search_query))]
    pub async fn search(&mut self) -> Result<()> {
        let query = self.search_query.trim().to_string();
        if query.is_empty() {
            return self.refresh_products().await;
        }

        add_breadcrumb("catalog", "Searched products", &[("query", query.as_str())]);
        match self.backend.search_products(&query).await {
            Ok(products) => {
                tracing::debug!(results = products.len(), "Search complete");
                self.products = products;
                Ok(())
            }
            Err(e) => Err(self.surface(e.into())),
        }
    }

    /// Empty the search box and show the unfiltered list again.
    ///
    /// # Errors
    ///
    /// Returns the failed request.
    pub async fn clear_search(&mut self) -> Result<()> {
        self.search_query.clear();
        self.refresh_products().await
    }

    async fn refresh_products(&mut self) -> Result<()> {
        match self.backend.list_products().await {
            Ok(products) => {
                self.products = products;
                Ok(())
            }
            Err(e) => Err(self.surface(e.into())),
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one of `product_id` to the cart, or remove one when `decrement`.
    ///
    /// A product not yet in the cart is added with quantity 1 either way.
    ///
    /// # Errors
    ///
    /// Returns the failed cart request.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn add_to_cart(&mut self, product_id: &ProductId, decrement: bool) -> Result<()> {
        let change = self.cart.quantity_change(product_id, decrement);
        let quantity = change.quantity.to_string();
        add_breadcrumb(
            "cart",
            "Changed quantity",
            &[
                ("product_id", product_id.as_str()),
                ("quantity", quantity.as_str()),
            ],
        );

        let ack = match self.backend.upsert_cart_line(&change).await {
            Ok(ack) => ack,
            Err(e) => return Err(self.surface(e.into())),
        };

        let message = ack
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| CART_UPDATED.to_string());
        self.snackbar.open(Notification::success(message));

        self.refresh_cart().await
    }

    /// Sum of price × quantity over the cart.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.cart.total()
    }

    async fn refresh_cart(&mut self) -> Result<()> {
        match self.backend.get_cart().await {
            Ok(cart) => {
                self.cart = cart;
                Ok(())
            }
            Err(e) => Err(self.surface(e.into())),
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    pub fn set_shipment_address(&mut self, address: impl Into<String>) {
        self.shipping.address = address.into();
    }

    pub fn set_billing_address(&mut self, address: impl Into<String>) {
        self.shipping.billing_address = address.into();
    }

    /// Whether the checkout button is enabled.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        CheckoutWorkflow::can_begin(&self.cart, &self.shipping)
    }

    /// The payment whose QR code is on screen, if any.
    #[must_use]
    pub const fn pending_payment(&self) -> Option<&PendingPayment> {
        self.checkout.pending()
    }

    /// Create the shipment and payment, and show the QR code.
    ///
    /// The address fields are cleared once the shipment exists, even if the
    /// payment step then fails.
    ///
    /// # Errors
    ///
    /// Returns the precondition or step failure.
    #[instrument(skip(self))]
    pub async fn checkout(&mut self) -> Result<PendingPayment> {
        add_breadcrumb("checkout", "Started checkout", &[]);
        let result = self
            .checkout
            .begin(&self.backend, &self.cart, &self.shipping)
            .await;

        match result {
            Ok(pending) => {
                self.shipping.clear();
                Ok(pending)
            }
            Err(e) => {
                if e.committed().is_some_and(|c| c.shipment_id().is_some()) {
                    self.shipping.clear();
                }
                Err(self.surface(e.into()))
            }
        }
    }

    /// Done: finalize the pending payment and refresh the cart.
    ///
    /// # Errors
    ///
    /// Returns the failed step; the QR code stays up so Done can be pressed
    /// again.
    #[instrument(skip(self))]
    pub async fn confirm_payment(&mut self) -> Result<CheckoutReceipt> {
        add_breadcrumb("checkout", "Confirmed payment", &[]);
        let receipt = match self.checkout.confirm(&self.backend).await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.surface(e.into())),
        };

        self.snackbar.open(Notification::success(ORDER_PLACED));
        self.refresh_cart().await?;
        Ok(receipt)
    }

    /// Cancel: hide the QR code. Nothing is sent to the backend.
    pub fn cancel_payment(&mut self) -> Option<PendingPayment> {
        self.checkout.cancel()
    }

    // =========================================================================
    // Notification
    // =========================================================================

    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        self.snackbar.current()
    }

    pub fn dismiss_notification(&self) -> Option<Notification> {
        self.snackbar.close()
    }

    /// Report `err`, show it on the banner unless the logout redirect already
    /// handled it, and hand it back.
    fn surface(&self, err: AppError) -> AppError {
        err.report();
        if !err.is_silent() {
            self.snackbar.open(Notification::error(err.user_message()));
        }
        err
    }
}
