//! The backend operations the checkout workflow and page controller need.
//!
//! [`ApiClient`] is the production implementation; tests substitute
//! recording fakes.

use async_trait::async_trait;
use bazaar_core::{Cart, Product, QuantityChange};

use super::{
    Acknowledgement, ApiClient, ApiError, CreatePayment, CreateShipment, PaymentCreated,
    PaymentStatusUpdate, ShipmentCreated, ShipmentStatusUpdate,
};

/// Storefront backend operations, one per REST endpoint.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError>;

    async fn get_cart(&self) -> Result<Cart, ApiError>;

    async fn upsert_cart_line(&self, change: &QuantityChange) -> Result<Acknowledgement, ApiError>;

    async fn update_cart_status(&self) -> Result<Acknowledgement, ApiError>;

    async fn create_shipment(&self, shipment: &CreateShipment)
    -> Result<ShipmentCreated, ApiError>;

    async fn update_shipment_status(
        &self,
        update: &ShipmentStatusUpdate,
    ) -> Result<Acknowledgement, ApiError>;

    async fn create_payment(&self, payment: &CreatePayment) -> Result<PaymentCreated, ApiError>;

    async fn update_payment_status(
        &self,
        update: &PaymentStatusUpdate,
    ) -> Result<Acknowledgement, ApiError>;
}

#[async_trait]
impl StoreBackend for ApiClient {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        Self::list_products(self).await
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        Self::search_products(self, query).await
    }

    async fn get_cart(&self) -> Result<Cart, ApiError> {
        Self::get_cart(self).await
    }

    async fn upsert_cart_line(&self, change: &QuantityChange) -> Result<Acknowledgement, ApiError> {
        Self::upsert_cart_line(self, change).await
    }

    async fn update_cart_status(&self) -> Result<Acknowledgement, ApiError> {
        Self::update_cart_status(self).await
    }

    async fn create_shipment(
        &self,
        shipment: &CreateShipment,
    ) -> Result<ShipmentCreated, ApiError> {
        Self::create_shipment(self, shipment).await
    }

    async fn update_shipment_status(
        &self,
        update: &ShipmentStatusUpdate,
    ) -> Result<Acknowledgement, ApiError> {
        Self::update_shipment_status(self, update).await
    }

    async fn create_payment(&self, payment: &CreatePayment) -> Result<PaymentCreated, ApiError> {
        Self::create_payment(self, payment).await
    }

    async fn update_payment_status(
        &self,
        update: &PaymentStatusUpdate,
    ) -> Result<Acknowledgement, ApiError> {
        Self::update_payment_status(self, update).await
    }
}
