//! UPI checkout: shipment, payment, confirmation and finalization.
//!
//! # Flow
//!
//! ```text
//! Idle ──begin──▶ [CreateShipment → CreatePayment] ──▶ AwaitingConfirmation
//!   ▲                                                     │        │
//!   └──────────────── cancel (local only) ────────────────┘        │
//!   └── confirm: [UpdatePaymentStatus → UpdateShipmentStatus → UpdateCartStatus]
//! ```
//!
//! Steps run strictly in order, each awaited before the next. A failing step
//! stops the sequence; nothing already committed on the backend is rolled
//! back. The error names the failed step and lists what was committed so the
//! caller can report or reconcile it.

mod workflow;

use bazaar_core::{PaymentId, ShipmentId};
use thiserror::Error;

use crate::api::ApiError;

pub use workflow::CheckoutWorkflow;

/// One request/response exchange of the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStep {
    /// `POST /shipment` with the addresses and cart snapshot.
    CreateShipment,
    /// `POST /payment` for the cart total.
    CreatePayment,
    /// `PUT /payment` → `paid`.
    UpdatePaymentStatus,
    /// `PUT /shipment` → `shipped`.
    UpdateShipmentStatus,
    /// `PUT /cart`.
    UpdateCartStatus,
}

impl CheckoutStep {
    /// Steps run by [`CheckoutWorkflow::begin`], in order.
    pub const INITIATE: [Self; 2] = [Self::CreateShipment, Self::CreatePayment];

    /// Steps run by [`CheckoutWorkflow::confirm`], in order.
    pub const FINALIZE: [Self; 3] = [
        Self::UpdatePaymentStatus,
        Self::UpdateShipmentStatus,
        Self::UpdateCartStatus,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateShipment => "create_shipment",
            Self::CreatePayment => "create_payment",
            Self::UpdatePaymentStatus => "update_payment_status",
            Self::UpdateShipmentStatus => "update_shipment_status",
            Self::UpdateCartStatus => "update_cart_status",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addresses entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingDetails {
    pub address: String,
    pub billing_address: String,
}

impl ShippingDetails {
    #[must_use]
    pub fn new(address: impl Into<String>, billing_address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            billing_address: billing_address.into(),
        }
    }

    /// Both addresses are filled in (whitespace does not count).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.address.trim().is_empty() && !self.billing_address.trim().is_empty()
    }

    /// Empty both fields.
    pub fn clear(&mut self) {
        self.address.clear();
        self.billing_address.clear();
    }
}

/// A payment created and waiting for the shopper to pay out-of-band.
///
/// The QR code, payment and shipment always travel together, so a QR code
/// without a payment id cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    pub shipment_id: ShipmentId,
    pub payment_id: PaymentId,
    /// UPI QR code image to show the shopper.
    pub qr_code_url: String,
}

/// Where the checkout currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// QR code shown; waiting for the shopper to press Done or Cancel.
    AwaitingConfirmation(PendingPayment),
}

/// Result of a fully confirmed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub shipment_id: ShipmentId,
    pub payment_id: PaymentId,
}

/// What a completed step committed on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    ShipmentCreated(ShipmentId),
    PaymentCreated {
        payment_id: PaymentId,
        qr_code_url: String,
    },
    PaymentPaid(PaymentId),
    ShipmentShipped(ShipmentId),
    CartCompleted,
}

impl StepOutput {
    /// The step that produced this output.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        match self {
            Self::ShipmentCreated(_) => CheckoutStep::CreateShipment,
            Self::PaymentCreated { .. } => CheckoutStep::CreatePayment,
            Self::PaymentPaid(_) => CheckoutStep::UpdatePaymentStatus,
            Self::ShipmentShipped(_) => CheckoutStep::UpdateShipmentStatus,
            Self::CartCompleted => CheckoutStep::UpdateCartStatus,
        }
    }
}

/// Ledger of the steps a run completed, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Committed {
    outputs: Vec<StepOutput>,
}

impl Committed {
    pub(crate) fn record(&mut self, output: StepOutput) {
        self.outputs.push(output);
    }

    /// Outputs of the completed steps, in execution order.
    #[must_use]
    pub fn outputs(&self) -> &[StepOutput] {
        &self.outputs
    }

    /// The completed steps, in execution order.
    #[must_use]
    pub fn steps(&self) -> Vec<CheckoutStep> {
        self.outputs.iter().map(StepOutput::step).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// The shipment created during this run, if that step completed.
    #[must_use]
    pub fn shipment_id(&self) -> Option<&ShipmentId> {
        self.outputs.iter().find_map(|output| match output {
            StepOutput::ShipmentCreated(id) => Some(id),
            _ => None,
        })
    }
}

/// Errors from the checkout workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was invoked without both addresses.
    #[error("Shipment address and billing address are required")]
    MissingAddress,

    /// Checkout was invoked on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Done was pressed with no payment awaiting confirmation.
    #[error("No payment is awaiting confirmation")]
    NothingToConfirm,

    /// A backend request failed; later steps were not attempted.
    #[error("Checkout step {step} failed: {source}")]
    StepFailed {
        step: CheckoutStep,
        /// What earlier steps of the same run committed.
        committed: Committed,
        source: ApiError,
    },
}

impl CheckoutError {
    /// What the run had committed before it stopped (empty for precondition
    /// failures).
    #[must_use]
    pub fn committed(&self) -> Option<&Committed> {
        match self {
            Self::StepFailed { committed, .. } => Some(committed),
            _ => None,
        }
    }

    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::StepFailed { source, .. } => source.user_message(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_details_completeness() {
        assert!(ShippingDetails::new("12 MG Road", "12 MG Road").is_complete());
        assert!(!ShippingDetails::new("", "12 MG Road").is_complete());
        assert!(!ShippingDetails::new("12 MG Road", "").is_complete());
        assert!(!ShippingDetails::new("   ", "12 MG Road").is_complete());
        assert!(!ShippingDetails::default().is_complete());
    }

    #[test]
    fn test_shipping_details_clear() {
        let mut details = ShippingDetails::new("a", "b");
        details.clear();
        assert_eq!(details, ShippingDetails::default());
    }

    #[test]
    fn test_committed_ledger() {
        let mut committed = Committed::default();
        assert!(committed.is_empty());
        assert!(committed.shipment_id().is_none());

        committed.record(StepOutput::ShipmentCreated(ShipmentId::new("shp_1")));
        committed.record(StepOutput::PaymentCreated {
            payment_id: PaymentId::new("pay_1"),
            qr_code_url: "qr".to_string(),
        });

        assert_eq!(committed.steps(), CheckoutStep::INITIATE.to_vec());
        assert_eq!(committed.shipment_id().map(ShipmentId::as_str), Some("shp_1"));
    }

    #[test]
    fn test_step_failed_display_and_message() {
        let err = CheckoutError::StepFailed {
            step: CheckoutStep::CreatePayment,
            committed: Committed::default(),
            source: ApiError::Status {
                status: 500,
                message: "UPI gateway unavailable".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Checkout step create_payment failed: Request failed with status code 500"
        );
        assert_eq!(err.user_message(), "UPI gateway unavailable");
        assert!(err.committed().is_some());
        assert!(CheckoutError::EmptyCart.committed().is_none());
    }
}
