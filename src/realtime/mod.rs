//! Websocket feeds for live delivery tracking and pushed notifications.
//!
//! Frames are applied to the owning store and then republished on the
//! broadcast channel. A closed or failed socket ends the call; reconnecting
//! is the caller's decision.

pub mod frame;

use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::notification::Notification;
use crate::store::delivery::DeliveryStore;
use crate::store::notification::NotificationStore;

use frame::{Frame, TrackerEvent, parse_frame};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RealtimeEvent {
    Delivery {
        delivery_id: Uuid,
        event: TrackerEvent,
    },
    Notification {
        notification: Notification,
    },
}

pub struct Tracker {
    ws_url: String,
    api: Arc<ApiClient>,
    deliveries: Arc<DeliveryStore>,
    notifications: Arc<NotificationStore>,
    events_tx: broadcast::Sender<RealtimeEvent>,
}

impl Tracker {
    pub fn new(
        ws_url: &str,
        api: Arc<ApiClient>,
        deliveries: Arc<DeliveryStore>,
        notifications: Arc<NotificationStore>,
        events_tx: broadcast::Sender<RealtimeEvent>,
    ) -> Self {
        Self {
            ws_url: ws_url.trim_end_matches('/').to_string(),
            api,
            deliveries,
            notifications,
            events_tx,
        }
    }

    /// Follows one shipment's tracker room and merges its updates into
    /// `delivery_id`.
    pub async fn track_shipment(
        &self,
        shipment_id: Uuid,
        delivery_id: Uuid,
    ) -> Result<(), ClientError> {
        let token = self.session_token()?;
        let url = format!("{}/ws/tracker/{shipment_id}/{token}/", self.ws_url);

        info!(shipment_id = %shipment_id, delivery_id = %delivery_id, "tracking shipment");

        self.consume(&url, |frame| match frame {
            Frame::Tracker(event) => {
                self.deliveries.apply_tracker_event(delivery_id, &event);
                let _ = self.events_tx.send(RealtimeEvent::Delivery { delivery_id, event });
            }
            Frame::Notification(_) | Frame::Ignored => {
                debug!(kind = frame.kind(), "frame not meant for the tracker feed");
            }
        })
        .await
    }

    pub async fn listen_notifications(&self, user_id: Uuid) -> Result<(), ClientError> {
        let token = self.session_token()?;
        let url = format!("{}/ws/notifications/{user_id}/{token}/", self.ws_url);

        info!(user_id = %user_id, "listening for notifications");

        self.consume(&url, |frame| match frame {
            Frame::Notification(pushed) => {
                let notification = pushed.into_notification(user_id);
                self.notifications.add_notification(notification.clone());
                let _ = self
                    .events_tx
                    .send(RealtimeEvent::Notification { notification });
            }
            Frame::Tracker(_) | Frame::Ignored => {
                debug!(kind = frame.kind(), "frame not meant for the notification feed");
            }
        })
        .await
    }

    fn session_token(&self) -> Result<String, ClientError> {
        self.api
            .access_token()
            .ok_or_else(|| ClientError::Realtime("no session token; log in first".to_string()))
    }

    async fn consume<F>(&self, url: &str, mut on_frame: F) -> Result<(), ClientError>
    where
        F: FnMut(Frame),
    {
        let (mut socket, _response) = connect_async(url)
            .await
            .map_err(|err| ClientError::Realtime(format!("connect failed: {err}")))?;

        while let Some(message) = socket.next().await {
            match message {
                Ok(Message::Text(text)) => match parse_frame(&text) {
                    Ok(frame) => {
                        self.api
                            .metrics()
                            .realtime_frames_total
                            .with_label_values(&[frame.kind()])
                            .inc();
                        on_frame(frame);
                    }
                    Err(err) => warn!(error = %err, "skipping realtime frame"),
                },
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "realtime socket closed by server");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    return Err(ClientError::Realtime(format!("socket error: {err}")));
                }
            }
        }

        info!("realtime feed ended");
        Ok(())
    }
}
