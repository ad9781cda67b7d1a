//! Sequential execution of the checkout steps.

use bazaar_core::{Cart, PaymentMethod, PaymentStatus, ShipmentStatus};
use tracing::instrument;

use super::{
    CheckoutError, CheckoutReceipt, CheckoutState, CheckoutStep, Committed, PendingPayment,
    ShippingDetails, StepOutput,
};
use crate::api::{
    ApiError, CreatePayment, CreateShipment, PaymentStatusUpdate, ShipmentStatusUpdate,
    StoreBackend,
};

/// Drives one shopper's checkout from address entry to a completed order.
#[derive(Debug, Default)]
pub struct CheckoutWorkflow {
    state: CheckoutState,
}

impl CheckoutWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// The payment awaiting confirmation, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingPayment> {
        match &self.state {
            CheckoutState::AwaitingConfirmation(pending) => Some(pending),
            CheckoutState::Idle => None,
        }
    }

    /// Whether checkout may start: the cart has lines and both addresses are
    /// filled in.
    #[must_use]
    pub fn can_begin(cart: &Cart, details: &ShippingDetails) -> bool {
        !cart.is_empty() && details.is_complete()
    }

    /// Create the shipment, then the payment, and wait for confirmation.
    ///
    /// Starting again while a payment is pending abandons that payment
    /// locally and creates a fresh shipment and payment.
    ///
    /// # Errors
    ///
    /// - `MissingAddress` / `EmptyCart` before any request is sent
    /// - `StepFailed` naming the failed step; a shipment created before a
    ///   failed payment step is reported in `committed`
    #[instrument(skip_all, fields(lines = cart.items().len()))]
    pub async fn begin<B>(
        &mut self,
        backend: &B,
        cart: &Cart,
        details: &ShippingDetails,
    ) -> Result<PendingPayment, CheckoutError>
    where
        B: StoreBackend + ?Sized,
    {
        if !details.is_complete() {
            return Err(CheckoutError::MissingAddress);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if let CheckoutState::AwaitingConfirmation(previous) = std::mem::take(&mut self.state) {
            tracing::warn!(
                payment_id = %previous.payment_id,
                shipment_id = %previous.shipment_id,
                "Superseding pending payment"
            );
        }

        let mut committed = Committed::default();

        let shipment = CreateShipment {
            address: details.address.clone(),
            billing_address: details.billing_address.clone(),
            items: cart.items().to_vec(),
        };
        let created = run_step(
            CheckoutStep::CreateShipment,
            &committed,
            backend.create_shipment(&shipment),
        )
        .await?;
        committed.record(StepOutput::ShipmentCreated(created.shipment_id.clone()));

        let payment = CreatePayment {
            cart_id: cart.cart_id().cloned(),
            amount: cart.total(),
            payment_method: PaymentMethod::Upi,
        };
        let payment = run_step(
            CheckoutStep::CreatePayment,
            &committed,
            backend.create_payment(&payment),
        )
        .await?;

        let pending = PendingPayment {
            shipment_id: created.shipment_id,
            payment_id: payment.payment_id,
            qr_code_url: payment.qr_code_url,
        };
        tracing::info!(
            payment_id = %pending.payment_id,
            shipment_id = %pending.shipment_id,
            "Payment awaiting confirmation"
        );
        self.state = CheckoutState::AwaitingConfirmation(pending.clone());
        Ok(pending)
    }

    /// Abandon the pending payment without contacting the backend.
    ///
    /// Returns the abandoned payment, or `None` if nothing was pending.
    pub fn cancel(&mut self) -> Option<PendingPayment> {
        match std::mem::take(&mut self.state) {
            CheckoutState::AwaitingConfirmation(pending) => {
                tracing::info!(payment_id = %pending.payment_id, "Payment cancelled");
                Some(pending)
            }
            CheckoutState::Idle => None,
        }
    }

    /// Mark the payment paid, the shipment shipped and the cart completed.
    ///
    /// On failure the payment stays pending, so confirming again re-runs the
    /// whole finalization sequence.
    ///
    /// # Errors
    ///
    /// - `NothingToConfirm` when no payment is pending
    /// - `StepFailed` naming the failed step and the steps that completed
    #[instrument(skip_all)]
    pub async fn confirm<B>(&mut self, backend: &B) -> Result<CheckoutReceipt, CheckoutError>
    where
        B: StoreBackend + ?Sized,
    {
        let Some(pending) = self.pending().cloned() else {
            return Err(CheckoutError::NothingToConfirm);
        };

        let mut committed = Committed::default();

        let paid = PaymentStatusUpdate {
            payment_id: pending.payment_id.clone(),
            status: PaymentStatus::Paid,
        };
        run_step(
            CheckoutStep::UpdatePaymentStatus,
            &committed,
            backend.update_payment_status(&paid),
        )
        .await?;
        committed.record(StepOutput::PaymentPaid(pending.payment_id.clone()));

        let shipped = ShipmentStatusUpdate {
            shipment_id: pending.shipment_id.clone(),
            status: ShipmentStatus::Shipped,
        };
        run_step(
            CheckoutStep::UpdateShipmentStatus,
            &committed,
            backend.update_shipment_status(&shipped),
        )
        .await?;
        committed.record(StepOutput::ShipmentShipped(pending.shipment_id.clone()));

        run_step(
            CheckoutStep::UpdateCartStatus,
            &committed,
            backend.update_cart_status(),
        )
        .await?;

        self.state = CheckoutState::Idle;
        tracing::info!(
            payment_id = %pending.payment_id,
            shipment_id = %pending.shipment_id,
            "Checkout complete"
        );

        Ok(CheckoutReceipt {
            shipment_id: pending.shipment_id,
            payment_id: pending.payment_id,
        })
    }
}

/// Await one step, turning a backend failure into `StepFailed`.
async fn run_step<T, F>(
    step: CheckoutStep,
    committed: &Committed,
    request: F,
) -> Result<T, CheckoutError>
where
    F: Future<Output = Result<T, ApiError>> + Send,
{
    tracing::debug!(step = %step, "Running checkout step");
    request.await.map_err(|source| {
        tracing::error!(
            step = %step,
            error = %source,
            completed = ?committed.steps(),
            "Checkout step failed"
        );
        CheckoutError::StepFailed {
            step,
            committed: committed.clone(),
            source,
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{CartId, Price};

    use super::*;
    use crate::test_support::{RecordingBackend, sample_cart};

    fn details() -> ShippingDetails {
        ShippingDetails::new("12 MG Road, Bengaluru", "12 MG Road, Bengaluru")
    }

    #[tokio::test]
    async fn test_begin_runs_initiation_in_order() {
        let backend = RecordingBackend::default();
        let mut workflow = CheckoutWorkflow::new();

        let pending = workflow
            .begin(&backend, &sample_cart(), &details())
            .await
            .unwrap();

        assert_eq!(backend.calls(), CheckoutStep::INITIATE.to_vec());
        assert_eq!(pending.shipment_id.as_str(), "shp_1");
        assert_eq!(pending.payment_id.as_str(), "pay_2");
        assert_eq!(pending.qr_code_url, "https://upi.example/qr/2.png");
        assert_eq!(workflow.pending(), Some(&pending));

        let shipment = backend.shipments.lock().unwrap()[0].clone();
        assert_eq!(shipment.address, "12 MG Road, Bengaluru");
        assert_eq!(shipment.items.len(), 2);

        let payment = backend.payments.lock().unwrap()[0].clone();
        assert_eq!(payment.amount, Price::from_rupees(11_000));
        assert_eq!(payment.cart_id, Some(CartId::new("cart_1")));
        assert_eq!(payment.payment_method, PaymentMethod::Upi);
    }

    #[tokio::test]
    async fn test_begin_preconditions_send_nothing() {
        let backend = RecordingBackend::default();
        let mut workflow = CheckoutWorkflow::new();

        let err = workflow
            .begin(&backend, &sample_cart(), &ShippingDetails::new("", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingAddress));

        let err = workflow
            .begin(&backend, &Cart::default(), &details())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));

        assert!(backend.calls().is_empty());
        assert_eq!(workflow.state(), &CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_shipment_failure_stops_before_payment() {
        let backend = RecordingBackend::failing(CheckoutStep::CreateShipment);
        let mut workflow = CheckoutWorkflow::new();

        let err = workflow
            .begin(&backend, &sample_cart(), &details())
            .await
            .unwrap_err();

        match err {
            CheckoutError::StepFailed {
                step, committed, ..
            } => {
                assert_eq!(step, CheckoutStep::CreateShipment);
                assert!(committed.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.calls(), vec![CheckoutStep::CreateShipment]);
        assert!(workflow.pending().is_none());
    }

    #[tokio::test]
    async fn test_payment_failure_reports_committed_shipment() {
        let backend = RecordingBackend::failing(CheckoutStep::CreatePayment);
        let mut workflow = CheckoutWorkflow::new();

        let err = workflow
            .begin(&backend, &sample_cart(), &details())
            .await
            .unwrap_err();

        let committed = err.committed().unwrap();
        assert_eq!(committed.steps(), vec![CheckoutStep::CreateShipment]);
        assert_eq!(committed.shipment_id().unwrap().as_str(), "shp_1");
        assert_eq!(err.user_message(), "create_payment unavailable");
        assert!(workflow.pending().is_none());
    }

    #[tokio::test]
    async fn test_confirm_runs_finalization_in_order() {
        let backend = RecordingBackend::default();
        let mut workflow = CheckoutWorkflow::new();
        let pending = workflow
            .begin(&backend, &sample_cart(), &details())
            .await
            .unwrap();

        let receipt = workflow.confirm(&backend).await.unwrap();

        let expected: Vec<_> = CheckoutStep::INITIATE
            .into_iter()
            .chain(CheckoutStep::FINALIZE)
            .collect();
        assert_eq!(backend.calls(), expected);
        assert_eq!(receipt.payment_id, pending.payment_id);
        assert_eq!(receipt.shipment_id, pending.shipment_id);

        let paid = backend.payment_updates.lock().unwrap()[0].clone();
        assert_eq!(paid.payment_id, pending.payment_id);
        assert_eq!(paid.status, PaymentStatus::Paid);

        let shipped = backend.shipment_updates.lock().unwrap()[0].clone();
        assert_eq!(shipped.shipment_id, pending.shipment_id);
        assert_eq!(shipped.status, ShipmentStatus::Shipped);

        assert_eq!(workflow.state(), &CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_confirm_without_pending_payment() {
        let backend = RecordingBackend::default();
        let mut workflow = CheckoutWorkflow::new();

        let err = workflow.confirm(&backend).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NothingToConfirm));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_failure_keeps_payment_pending() {
        let backend = RecordingBackend::failing(CheckoutStep::UpdateShipmentStatus);
        let mut workflow = CheckoutWorkflow::new();
        let pending = workflow
            .begin(&backend, &sample_cart(), &details())
            .await
            .unwrap();

        let err = workflow.confirm(&backend).await.unwrap_err();
        match &err {
            CheckoutError::StepFailed {
                step, committed, ..
            } => {
                assert_eq!(*step, CheckoutStep::UpdateShipmentStatus);
                assert_eq!(committed.steps(), vec![CheckoutStep::UpdatePaymentStatus]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!backend.calls().contains(&CheckoutStep::UpdateCartStatus));
        assert_eq!(workflow.pending(), Some(&pending));

        backend.recover(CheckoutStep::UpdateShipmentStatus);
        workflow.confirm(&backend).await.unwrap();
        assert_eq!(backend.payment_updates.lock().unwrap().len(), 2);
        assert!(workflow.pending().is_none());
    }

    #[tokio::test]
    async fn test_cancel_is_local() {
        let backend = RecordingBackend::default();
        let mut workflow = CheckoutWorkflow::new();
        let pending = workflow
            .begin(&backend, &sample_cart(), &details())
            .await
            .unwrap();

        assert_eq!(workflow.cancel(), Some(pending));
        assert_eq!(workflow.state(), &CheckoutState::Idle);
        assert!(workflow.cancel().is_none());
        assert_eq!(backend.calls(), CheckoutStep::INITIATE.to_vec());
    }

    #[tokio::test]
    async fn test_begin_again_supersedes_pending_payment() {
        let backend = RecordingBackend::default();
        let mut workflow = CheckoutWorkflow::new();

        let first = workflow
            .begin(&backend, &sample_cart(), &details())
            .await
            .unwrap();
        let second = workflow
            .begin(&backend, &sample_cart(), &details())
            .await
            .unwrap();

        assert_ne!(first.payment_id, second.payment_id);
        assert_eq!(workflow.pending(), Some(&second));
        assert_eq!(backend.shipments.lock().unwrap().len(), 2);
    }
}
