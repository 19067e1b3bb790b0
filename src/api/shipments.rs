use uuid::Uuid;

use crate::api::{ApiClient, DataEnvelope, PAGE_SIZE, Page};
use crate::error::ClientError;
use crate::models::shipment::{Shipment, ShipmentDraft};

const SHIPMENTS_PATH: &str = "/shipments/";

fn shipment_path(id: Uuid) -> String {
    format!("/shipments/{id}/")
}

impl ApiClient {
    pub async fn list_shipments(&self, page: u32) -> Result<Page<Shipment>, ClientError> {
        self.get_query(
            SHIPMENTS_PATH,
            &[("page", page.to_string()), ("page_size", PAGE_SIZE.to_string())],
        )
        .await
    }

    pub async fn shipment(&self, id: Uuid) -> Result<Shipment, ClientError> {
        let envelope: DataEnvelope<Shipment> = self.get(&shipment_path(id)).await?;
        Ok(envelope.data)
    }

    pub async fn create_shipment(&self, draft: &ShipmentDraft) -> Result<Shipment, ClientError> {
        let envelope: DataEnvelope<Shipment> = self.post(SHIPMENTS_PATH, draft).await?;
        Ok(envelope.data)
    }

    pub async fn update_shipment(
        &self,
        id: Uuid,
        draft: &ShipmentDraft,
    ) -> Result<Shipment, ClientError> {
        let envelope: DataEnvelope<Shipment> = self.put(&shipment_path(id), draft).await?;
        Ok(envelope.data)
    }

    pub async fn delete_shipment(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&shipment_path(id)).await
    }
}
