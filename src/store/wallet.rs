use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::api::ApiClient;
use crate::models::wallet::WalletBalance;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletState {
    pub balance: Option<WalletBalance>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Read-only view of the signed-in user's wallet.
pub struct WalletStore {
    api: Arc<ApiClient>,
    state: watch::Sender<WalletState>,
}

impl WalletStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            state: watch::Sender::new(WalletState::default()),
        }
    }

    pub fn snapshot(&self) -> WalletState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    pub async fn fetch_balance(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        match self.api.wallet_balance().await {
            Ok(balance) => {
                self.state.send_modify(|state| {
                    state.balance = Some(balance);
                    state.is_loading = false;
                });
            }
            Err(err) => {
                let message = err.user_message("Failed to fetch wallet");
                warn!(error = %err, reason = %message, "wallet request failed");
                self.state.send_modify(|state| {
                    state.error = Some(message);
                    state.is_loading = false;
                });
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }
}
