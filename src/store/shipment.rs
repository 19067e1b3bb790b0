//! Customer-side shipment collection.
//!
//! Fetches are best-effort: failures land in `error` and are not returned.
//! Mutations record the error and hand it back so the caller can stay on
//! the form.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::shipment::{Shipment, ShipmentDraft};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipmentState {
    /// Most recent first.
    pub shipments: Vec<Shipment>,
    pub current_shipment: Option<Shipment>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct ShipmentStore {
    api: Arc<ApiClient>,
    state: watch::Sender<ShipmentState>,
}

impl ShipmentStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: watch::Sender::new(ShipmentState::default()),
        }
    }

    pub fn snapshot(&self) -> ShipmentState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ShipmentState> {
        self.state.subscribe()
    }

    /// Replaces the visible list with one page of results. A response that
    /// lands after a concurrent `create_shipment` overwrites the prepended
    /// entry; callers re-fetch to reconcile.
    pub async fn fetch_shipments(&self, page: u32) {
        self.begin();

        match self.api.list_shipments(page.max(1)).await {
            Ok(page) => {
                self.state.send_modify(|state| {
                    state.shipments = page.results;
                    state.is_loading = false;
                });
            }
            Err(err) => self.fail(&err, "Failed to fetch shipments"),
        }
    }

    pub async fn fetch_shipment(&self, id: Uuid) {
        self.begin();

        match self.api.shipment(id).await {
            Ok(shipment) => {
                self.state.send_modify(|state| {
                    state.current_shipment = Some(shipment);
                    state.is_loading = false;
                });
            }
            Err(err) => self.fail(&err, "Failed to fetch shipment"),
        }
    }

    pub async fn create_shipment(&self, draft: &ShipmentDraft) -> Result<Shipment, ClientError> {
        self.begin();

        match self.api.create_shipment(draft).await {
            Ok(shipment) => {
                info!(shipment_id = %shipment.id, "shipment created");
                self.state.send_modify(|state| {
                    state.shipments.insert(0, shipment.clone());
                    state.is_loading = false;
                });
                Ok(shipment)
            }
            Err(err) => {
                self.fail(&err, "Failed to create shipment");
                Err(err)
            }
        }
    }

    pub async fn update_shipment(
        &self,
        id: Uuid,
        draft: &ShipmentDraft,
    ) -> Result<Shipment, ClientError> {
        self.begin();

        match self.api.update_shipment(id, draft).await {
            Ok(shipment) => {
                info!(shipment_id = %id, "shipment updated");
                self.state.send_modify(|state| {
                    for entry in state.shipments.iter_mut().filter(|entry| entry.id == id) {
                        *entry = shipment.clone();
                    }
                    if state.current_shipment.as_ref().is_some_and(|current| current.id == id) {
                        state.current_shipment = Some(shipment.clone());
                    }
                    state.is_loading = false;
                });
                Ok(shipment)
            }
            Err(err) => {
                self.fail(&err, "Failed to update shipment");
                Err(err)
            }
        }
    }

    pub async fn delete_shipment(&self, id: Uuid) -> Result<(), ClientError> {
        self.begin();

        match self.api.delete_shipment(id).await {
            Ok(()) => {
                info!(shipment_id = %id, "shipment deleted");
                self.state.send_modify(|state| {
                    state.shipments.retain(|entry| entry.id != id);
                    if state.current_shipment.as_ref().is_some_and(|current| current.id == id) {
                        state.current_shipment = None;
                    }
                    state.is_loading = false;
                });
                Ok(())
            }
            Err(err) => {
                self.fail(&err, "Failed to delete shipment");
                Err(err)
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    fn fail(&self, err: &ClientError, default_message: &str) {
        let message = err.user_message(default_message);
        warn!(error = %err, reason = %message, "shipment request failed");
        self.state.send_modify(|state| {
            state.error = Some(message);
            state.is_loading = false;
        });
    }
}
