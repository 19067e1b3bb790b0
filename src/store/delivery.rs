//! Courier-side delivery collection.
//!
//! Status transitions are validated by the server. The store reflects
//! whatever status comes back and never checks legality locally.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::delivery::Delivery;
use crate::models::shipment::ShipmentStatus;
use crate::realtime::frame::TrackerEvent;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryState {
    pub deliveries: Vec<Delivery>,
    pub current_delivery: Option<Delivery>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl DeliveryState {
    /// Applies `change` to every held copy of delivery `id`.
    fn merge(&mut self, id: Uuid, change: impl Fn(&mut Delivery)) -> bool {
        let mut touched = false;

        for delivery in self.deliveries.iter_mut().filter(|d| d.id == id) {
            change(delivery);
            touched = true;
        }

        if let Some(current) = self.current_delivery.as_mut().filter(|d| d.id == id) {
            change(current);
            touched = true;
        }

        touched
    }
}

pub struct DeliveryStore {
    api: Arc<ApiClient>,
    state: watch::Sender<DeliveryState>,
}

impl DeliveryStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: watch::Sender::new(DeliveryState::default()),
        }
    }

    pub fn snapshot(&self) -> DeliveryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeliveryState> {
        self.state.subscribe()
    }

    pub async fn fetch_deliveries(&self, page: u32) {
        self.begin();

        match self.api.list_deliveries(page.max(1)).await {
            Ok(page) => {
                self.state.send_modify(|state| {
                    state.deliveries = page.results;
                    state.is_loading = false;
                });
            }
            Err(err) => self.fail(&err, "Failed to fetch deliveries"),
        }
    }

    pub async fn fetch_delivery(&self, id: Uuid) {
        self.begin();

        match self.api.delivery(id).await {
            Ok(delivery) => {
                self.state.send_modify(|state| {
                    state.current_delivery = Some(delivery);
                    state.is_loading = false;
                });
            }
            Err(err) => self.fail(&err, "Failed to fetch delivery"),
        }
    }

    /// Patches the status and merges only the returned status into the held
    /// copies; every other field is left as it was.
    pub async fn update_delivery_status(
        &self,
        id: Uuid,
        status: ShipmentStatus,
    ) -> Result<ShipmentStatus, ClientError> {
        self.begin();

        match self.api.update_delivery_status(id, status).await {
            Ok(applied) => {
                info!(delivery_id = %id, requested = %status, applied = %applied, "delivery status updated");
                self.state.send_modify(|state| {
                    state.merge(id, |delivery| delivery.status = applied);
                    state.is_loading = false;
                });
                Ok(applied)
            }
            Err(err) => {
                self.fail(&err, "Failed to update delivery");
                Err(err)
            }
        }
    }

    /// Merges a pushed tracker update. Returns whether any held copy changed.
    pub fn apply_tracker_event(&self, id: Uuid, event: &TrackerEvent) -> bool {
        let mut touched = false;

        self.state.send_if_modified(|state| {
            touched = match event {
                TrackerEvent::Location(location) => {
                    state.merge(id, |delivery| delivery.current_location = *location)
                }
                TrackerEvent::Status(status) => {
                    state.merge(id, |delivery| delivery.status = *status)
                }
            };
            touched
        });

        if !touched {
            debug!(delivery_id = %id, "tracker update for a delivery not held locally");
        }

        touched
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
        warn!(error = %err, reason = %message, "delivery request failed");
        self.state.send_modify(|state| {
            state.error = Some(message);
            state.is_loading = false;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::DeliveryStore;
    use crate::api::ApiClient;
    use crate::models::delivery::{Coordinates, Delivery};
    use crate::models::shipment::ShipmentStatus;
    use crate::observability::metrics::Metrics;
    use crate::realtime::frame::TrackerEvent;

    fn delivery(id: Uuid) -> Delivery {
        Delivery {
            id,
            shipment_id: Uuid::new_v4(),
            courier_id: Uuid::new_v4(),
            current_location: Coordinates {
                latitude: 6.45,
                longitude: 3.39,
            },
            status: ShipmentStatus::Accepted,
            started_at: None,
            completed_at: None,
            estimated_delivery_time: None,
        }
    }

    fn store_with(deliveries: Vec<Delivery>, current: Option<Delivery>) -> DeliveryStore {
        let api = ApiClient::new("http://127.0.0.1:9/api/v1", Metrics::new()).unwrap();
        let store = DeliveryStore::new(Arc::new(api));
        store.state.send_modify(|state| {
            state.deliveries = deliveries;
            state.current_delivery = current;
        });
        store
    }

    #[test]
    fn tracker_status_updates_list_and_current() {
        let id = Uuid::new_v4();
        let store = store_with(vec![delivery(id), delivery(Uuid::new_v4())], Some(delivery(id)));

        let touched = store.apply_tracker_event(id, &TrackerEvent::Status(ShipmentStatus::InTransit));
        let state = store.snapshot();

        assert!(touched);
        assert_eq!(state.deliveries[0].status, ShipmentStatus::InTransit);
        assert_eq!(state.deliveries[1].status, ShipmentStatus::Accepted);
        assert_eq!(
            state.current_delivery.map(|d| d.status),
            Some(ShipmentStatus::InTransit)
        );
    }

    #[test]
    fn tracker_location_leaves_status_alone() {
        let id = Uuid::new_v4();
        let store = store_with(vec![delivery(id)], None);
        let location = Coordinates {
            latitude: 6.5,
            longitude: 3.4,
        };

        store.apply_tracker_event(id, &TrackerEvent::Location(location));
        let state = store.snapshot();

        assert_eq!(state.deliveries[0].current_location, location);
        assert_eq!(state.deliveries[0].status, ShipmentStatus::Accepted);
    }

    #[test]
    fn tracker_event_for_unknown_delivery_changes_nothing() {
        let store = store_with(vec![delivery(Uuid::new_v4())], None);
        let before = store.snapshot();
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        let touched = store.apply_tracker_event(
            Uuid::new_v4(),
            &TrackerEvent::Status(ShipmentStatus::Delivered),
        );

        assert!(!touched);
        assert_eq!(store.snapshot(), before);
        assert!(!rx.has_changed().unwrap());
    }
}
