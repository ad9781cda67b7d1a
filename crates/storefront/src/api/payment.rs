//! UPI payment endpoints.

use bazaar_core::{CartId, PaymentId, PaymentMethod, PaymentStatus, Price};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{Acknowledgement, ApiClient, ApiError};

/// Request body for creating a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<CartId>,
    pub amount: Price,
    pub payment_method: PaymentMethod,
}

/// Response from creating a payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreated {
    /// Image URL of the UPI QR code the shopper scans.
    #[serde(rename = "qrCodeURL")]
    pub qr_code_url: String,
    pub payment_id: PaymentId,
}

/// Request body for moving a payment to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdate {
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
}

impl ApiClient {
    /// Create a payment and obtain its UPI QR code.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response lacks the
    /// payment id or QR code URL.
    #[instrument(skip(self, payment), fields(amount = %payment.amount))]
    pub async fn create_payment(
        &self,
        payment: &CreatePayment,
    ) -> Result<PaymentCreated, ApiError> {
        let request = self.request(Method::POST, "payment")?.json(payment);
        self.send_json(request).await
    }

    /// Update a payment's status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(payment_id = %update.payment_id, status = %update.status))]
    pub async fn update_payment_status(
        &self,
        update: &PaymentStatusUpdate,
    ) -> Result<Acknowledgement, ApiError> {
        let request = self.request(Method::PUT, "payment")?.json(update);
        self.send_ack(request).await
    }
}
