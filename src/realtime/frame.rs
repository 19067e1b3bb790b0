use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ClientError;
use crate::models::delivery::Coordinates;
use crate::models::notification::Notification;
use crate::models::shipment::ShipmentStatus;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TrackerEvent {
    Location(Coordinates),
    Status(ShipmentStatus),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushedNotification {
    pub title: String,
    pub message: String,
    pub data: Value,
}

impl PushedNotification {
    /// Pushed notifications carry no identity of their own; one is minted
    /// locally so the feed can address the entry.
    pub fn into_notification(self, user_id: Uuid) -> Notification {
        let related_object = match self.data {
            Value::Null => String::new(),
            Value::String(text) => text,
            other => other.to_string(),
        };

        Notification {
            id: Uuid::new_v4(),
            user_id,
            title: self.title,
            message: self.message,
            is_read: false,
            related_object,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Tracker(TrackerEvent),
    Notification(PushedNotification),
    Ignored,
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Tracker(TrackerEvent::Location(_)) => "location_update",
            Frame::Tracker(TrackerEvent::Status(_)) => "status_update",
            Frame::Notification(_) => "notification",
            Frame::Ignored => "ignored",
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawFrame {
    LocationUpdate {
        location: Coordinates,
    },
    StatusUpdate {
        status: ShipmentStatus,
    },
    Notification {
        title: String,
        message: String,
        #[serde(default)]
        data: Value,
    },
    #[serde(other)]
    Unknown,
}

pub fn parse_frame(text: &str) -> Result<Frame, ClientError> {
    let raw: RawFrame = serde_json::from_str(text)
        .map_err(|err| ClientError::Realtime(format!("malformed frame: {err}")))?;

    Ok(match raw {
        RawFrame::LocationUpdate { location } => Frame::Tracker(TrackerEvent::Location(location)),
        RawFrame::StatusUpdate { status } => Frame::Tracker(TrackerEvent::Status(status)),
        RawFrame::Notification {
            title,
            message,
            data,
        } => Frame::Notification(PushedNotification {
            title,
            message,
            data,
        }),
        RawFrame::Unknown => Frame::Ignored,
    })
}
