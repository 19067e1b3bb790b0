use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ClientError;
use crate::observability::metrics::Metrics;
use crate::realtime::{RealtimeEvent, Tracker};
use crate::store::delivery::DeliveryStore;
use crate::store::notification::NotificationStore;
use crate::store::persist::SessionStorage;
use crate::store::session::SessionStore;
use crate::store::shipment::ShipmentStore;
use crate::store::wallet::WalletStore;

/// Composition root. Built once per process; each store owns its slice and
/// none of them reaches into another.
pub struct AppState {
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub shipments: Arc<ShipmentStore>,
    pub deliveries: Arc<DeliveryStore>,
    pub notifications: Arc<NotificationStore>,
    pub wallet: Arc<WalletStore>,
    pub tracker: Tracker,
    pub events_tx: broadcast::Sender<RealtimeEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config, storage: Arc<dyn SessionStorage>) -> Result<Self, ClientError> {
        let metrics = Metrics::new();
        let api = Arc::new(
            ApiClient::new(&config.api_url, metrics.clone())?
                .with_site_root(&config.site_root(), &config.push_token_path),
        );

        let (events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        let session = Arc::new(SessionStore::restore(api.clone(), storage));
        let shipments = Arc::new(ShipmentStore::new(api.clone()));
        let deliveries = Arc::new(DeliveryStore::new(api.clone()));
        let notifications = Arc::new(NotificationStore::new());
        let wallet = Arc::new(WalletStore::new(api.clone()));

        let tracker = Tracker::new(
            &config.ws_url,
            api.clone(),
            deliveries.clone(),
            notifications.clone(),
            events_tx.clone(),
        );

        Ok(Self {
            api,
            session,
            shipments,
            deliveries,
            notifications,
            wallet,
            tracker,
            events_tx,
            metrics,
        })
    }

    /// Realtime events as a stream. Lagged receivers skip what they missed.
    pub fn events(&self) -> impl Stream<Item = RealtimeEvent> + use<> {
        BroadcastStream::new(self.events_tx.subscribe()).filter_map(|event| event.ok())
    }
}
