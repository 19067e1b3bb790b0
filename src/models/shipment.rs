use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    Accepted,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Accepted => "accepted",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "pending" => Ok(ShipmentStatus::Pending),
            "accepted" => Ok(ShipmentStatus::Accepted),
            "in_transit" => Ok(ShipmentStatus::InTransit),
            "delivered" => Ok(ShipmentStatus::Delivered),
            "cancelled" => Ok(ShipmentStatus::Cancelled),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Geocoding happens server-side; drafts may carry zero coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    #[serde(default, deserialize_with = "crate::models::decimal")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "crate::models::decimal")]
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: Uuid,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_email: String,
    pub pickup_address: Address,
    pub delivery_address: Address,
    pub description: String,
    #[serde(deserialize_with = "crate::models::decimal")]
    pub weight: f64,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub special_instructions: String,
    pub status: ShipmentStatus,
    #[serde(deserialize_with = "crate::models::decimal")]
    pub price: f64,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Editable fields of an existing shipment, for the edit form round-trip.
    pub fn to_draft(&self) -> ShipmentDraft {
        ShipmentDraft {
            receiver_name: self.receiver_name.clone(),
            receiver_phone: self.receiver_phone.clone(),
            receiver_email: self.receiver_email.clone(),
            pickup_address: self.pickup_address.clone(),
            delivery_address: self.delivery_address.clone(),
            description: self.description.clone(),
            weight: self.weight,
            dimensions: self.dimensions.clone(),
            special_instructions: self.special_instructions.clone(),
        }
    }
}

/// Client-submitted shipment fields. Identity, status, price and audit
/// timestamps are assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShipmentDraft {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_email: String,
    pub pickup_address: Address,
    pub delivery_address: Address,
    pub description: String,
    pub weight: f64,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub special_instructions: String,
}
