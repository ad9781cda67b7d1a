//! Shared fakes for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use bazaar_core::{
    Cart, CartId, CartItem, PaymentId, Price, Product, QuantityChange, ShipmentId,
};

use crate::api::{
    Acknowledgement, ApiError, CreatePayment, CreateShipment, PaymentCreated,
    PaymentStatusUpdate, ShipmentCreated, ShipmentStatusUpdate, StoreBackend,
};
use crate::checkout::CheckoutStep;

/// Backend fake that records every call in order.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub calls: Mutex<Vec<CheckoutStep>>,
    pub shipments: Mutex<Vec<CreateShipment>>,
    pub payments: Mutex<Vec<CreatePayment>>,
    pub payment_updates: Mutex<Vec<PaymentStatusUpdate>>,
    pub shipment_updates: Mutex<Vec<ShipmentStatusUpdate>>,
    pub fail: Mutex<HashSet<CheckoutStep>>,
    pub counter: Mutex<u32>,
    pub products: Mutex<Vec<Product>>,
    pub cart: Mutex<Cart>,
    pub cart_changes: Mutex<Vec<QuantityChange>>,
    pub searches: Mutex<Vec<String>>,
    /// Status code returned by every catalog and cart request when set.
    pub reject_with: Mutex<Option<u16>>,
}

impl RecordingBackend {
    pub fn failing(step: CheckoutStep) -> Self {
        let backend = Self::default();
        backend.fail.lock().unwrap().insert(step);
        backend
    }

    pub fn recover(&self, step: CheckoutStep) {
        self.fail.lock().unwrap().remove(&step);
    }

    pub fn calls(&self) -> Vec<CheckoutStep> {
        self.calls.lock().unwrap().clone()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let backend = Self::default();
        *backend.products.lock().unwrap() = products;
        backend
    }

    pub fn reject(&self, status: Option<u16>) {
        *self.reject_with.lock().unwrap() = status;
    }

    fn check_rejected(&self) -> Result<(), ApiError> {
        match *self.reject_with.lock().unwrap() {
            Some(401) => Err(ApiError::Unauthorized),
            Some(status) => Err(ApiError::Status {
                status,
                message: format!("status {status}"),
            }),
            None => Ok(()),
        }
    }

    fn enter(&self, step: CheckoutStep) -> Result<u32, ApiError> {
        self.calls.lock().unwrap().push(step);
        if self.fail.lock().unwrap().contains(&step) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("{step} unavailable"),
            });
        }
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        Ok(*counter)
    }
}

#[async_trait]
impl StoreBackend for RecordingBackend {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.check_rejected()?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        self.check_rejected()?;
        self.searches.lock().unwrap().push(query.to_string());
        let needle = query.to_lowercase();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| product.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.check_rejected()?;
        Ok(self.cart.lock().unwrap().clone())
    }

    async fn upsert_cart_line(
        &self,
        change: &QuantityChange,
    ) -> Result<Acknowledgement, ApiError> {
        self.check_rejected()?;
        self.cart_changes.lock().unwrap().push(change.clone());

        let mut items = self.cart.lock().unwrap().items().to_vec();
        match items
            .iter_mut()
            .find(|item| item.product.id == change.product_id)
        {
            Some(item) => item.quantity = change.quantity,
            None => {
                let product = self
                    .products
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|product| product.id == change.product_id)
                    .cloned()
                    .unwrap();
                items.push(CartItem::new(product, change.quantity));
            }
        }
        *self.cart.lock().unwrap() = Cart::new(items);

        Ok(Acknowledgement {
            message: Some("Cart updated".to_string()),
        })
    }

    async fn update_cart_status(&self) -> Result<Acknowledgement, ApiError> {
        self.enter(CheckoutStep::UpdateCartStatus)?;
        Ok(Acknowledgement::default())
    }

    async fn create_shipment(
        &self,
        shipment: &CreateShipment,
    ) -> Result<ShipmentCreated, ApiError> {
        let n = self.enter(CheckoutStep::CreateShipment)?;
        self.shipments.lock().unwrap().push(shipment.clone());
        Ok(ShipmentCreated {
            shipment_id: ShipmentId::new(format!("shp_{n}")),
        })
    }

    async fn update_shipment_status(
        &self,
        update: &ShipmentStatusUpdate,
    ) -> Result<Acknowledgement, ApiError> {
        self.enter(CheckoutStep::UpdateShipmentStatus)?;
        self.shipment_updates.lock().unwrap().push(update.clone());
        Ok(Acknowledgement::default())
    }

    async fn create_payment(&self, payment: &CreatePayment) -> Result<PaymentCreated, ApiError> {
        let n = self.enter(CheckoutStep::CreatePayment)?;
        self.payments.lock().unwrap().push(payment.clone());
        Ok(PaymentCreated {
            qr_code_url: format!("https://upi.example/qr/{n}.png"),
            payment_id: PaymentId::new(format!("pay_{n}")),
        })
    }

    async fn update_payment_status(
        &self,
        update: &PaymentStatusUpdate,
    ) -> Result<Acknowledgement, ApiError> {
        self.enter(CheckoutStep::UpdatePaymentStatus)?;
        self.payment_updates.lock().unwrap().push(update.clone());
        Ok(Acknowledgement::default())
    }
}

pub(crate) fn sample_cart() -> Cart {
    let phone = Product::new("p1", "Phone", Price::from_rupees(10_000));
    let case = Product::new("p2", "Phone Case", Price::from_rupees(500));
    let mut first = CartItem::new(phone, 1);
    first.cart_id = Some(CartId::new("cart_1"));
    [first, CartItem::new(case, 2)].into_iter().collect()
}

