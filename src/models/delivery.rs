use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::shipment::ShipmentStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Coordinates {
    #[serde(deserialize_with = "crate::models::decimal")]
    pub latitude: f64,
    #[serde(deserialize_with = "crate::models::decimal")]
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub courier_id: Uuid,
    #[serde(default)]
    pub current_location: Coordinates,
    pub status: ShipmentStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPatch {
    pub status: ShipmentStatus,
}
