use uuid::Uuid;

use crate::api::{ApiClient, DataEnvelope, PAGE_SIZE, Page};
use crate::error::ClientError;
use crate::models::delivery::{Delivery, StatusPatch};
use crate::models::shipment::ShipmentStatus;

const DELIVERIES_PATH: &str = "/deliveries/";

fn delivery_path(id: Uuid) -> String {
    format!("/deliveries/{id}/")
}

impl ApiClient {
    pub async fn list_deliveries(&self, page: u32) -> Result<Page<Delivery>, ClientError> {
        self.get_query(
            DELIVERIES_PATH,
            &[("page", page.to_string()), ("page_size", PAGE_SIZE.to_string())],
        )
        .await
    }

    pub async fn delivery(&self, id: Uuid) -> Result<Delivery, ClientError> {
        let envelope: DataEnvelope<Delivery> = self.get(&delivery_path(id)).await?;
        Ok(envelope.data)
    }

    /// Patches only the status field and returns the status the server
    /// settled on. Any other echoed fields are ignored.
    pub async fn update_delivery_status(
        &self,
        id: Uuid,
        status: ShipmentStatus,
    ) -> Result<ShipmentStatus, ClientError> {
        let envelope: DataEnvelope<StatusPatch> = self
            .patch(&delivery_path(id), &StatusPatch { status })
            .await?;
        Ok(envelope.data.status)
    }
}
