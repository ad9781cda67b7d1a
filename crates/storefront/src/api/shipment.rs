//! Shipment endpoints.

use bazaar_core::{CartItem, ShipmentId, ShipmentStatus};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{Acknowledgement, ApiClient, ApiError};

/// Request body for creating a shipment from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipment {
    pub address: String,
    pub billing_address: String,
    /// Snapshot of every cart line at checkout time.
    pub items: Vec<CartItem>,
}

/// Response from creating a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentCreated {
    pub shipment_id: ShipmentId,
}

/// Request body for moving a shipment to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentStatusUpdate {
    pub shipment_id: ShipmentId,
    pub status: ShipmentStatus,
}

impl ApiClient {
    /// Create a shipment for the given addresses and cart lines.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response lacks a
    /// shipment id.
    #[instrument(skip(self, shipment), fields(items = shipment.items.len()))]
    pub async fn create_shipment(
        &self,
        shipment: &CreateShipment,
    ) -> Result<ShipmentCreated, ApiError> {
        let request = self.request(Method::POST, "shipment")?.json(shipment);
        self.send_json(request).await
    }

    /// Update a shipment's status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self), fields(shipment_id = %update.shipment_id, status = %update.status))]
    pub async fn update_shipment_status(
        &self,
        update: &ShipmentStatusUpdate,
    ) -> Result<Acknowledgement, ApiError> {
        let request = self.request(Method::PUT, "shipment")?.json(update);
        self.send_ack(request).await
    }
}
