//! Authentication state.
//!
//! The session store is the single writer of the API client's bearer
//! credential. After any operation completes the state is either fully
//! unauthenticated or authenticated with user and both tokens present
//! (`set_tokens` and `refresh_user` are the documented exceptions).

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::user::{RegisterRequest, Role, TokenPair, User};
use crate::store::persist::{PersistedSession, SessionStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    /// Gate for role-restricted views. `None` only requires a session.
    pub fn authorize(&self, required: Option<Role>) -> Access {
        if !self.is_authenticated {
            return Access::Unauthenticated;
        }

        match (required, self.role()) {
            (None, _) => Access::Granted,
            (Some(required), Some(role)) if required == role => Access::Granted,
            _ => Access::Forbidden,
        }
    }

    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            user: self.user.clone(),
        }
    }
}

pub struct SessionStore {
    api: Arc<ApiClient>,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(api: Arc<ApiClient>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            api,
            storage,
            state: watch::Sender::new(SessionState::default()),
        }
    }

    /// Rebuilds the session from storage. `is_authenticated` is derived from
    /// the persisted record; an incomplete record is discarded.
    pub fn restore(api: Arc<ApiClient>, storage: Arc<dyn SessionStorage>) -> Self {
        let store = Self::new(api, storage);

        let persisted = match store.storage.load() {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable persisted session");
                None
            }
        };

        let Some(persisted) = persisted else {
            return store;
        };

        if persisted.is_empty() {
            return store;
        }

        match persisted.complete() {
            Some((tokens, user)) => {
                store.api.set_tokens(tokens.clone());
                store.state.send_modify(|state| {
                    state.access_token = Some(tokens.access);
                    state.refresh_token = Some(tokens.refresh);
                    state.user = Some(user);
                    state.is_authenticated = true;
                });
                store.api.metrics().session_authenticated.set(1);
                info!("restored persisted session");
            }
            None => {
                warn!("discarding incomplete persisted session");
                if let Err(err) = store.storage.clear() {
                    warn!(error = %err, "failed to clear persisted session");
                }
            }
        }

        store
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn authorize(&self, required: Option<Role>) -> Access {
        self.state.borrow().authorize(required)
    }

    /// `authorize` as a `Result`, for callers that bail out on refusal.
    pub fn require(&self, required: Option<Role>) -> Result<(), ClientError> {
        match (self.authorize(required), required) {
            (Access::Granted, _) => Ok(()),
            (Access::Forbidden, Some(role)) => Err(ClientError::Forbidden(role)),
            _ => Err(ClientError::Unauthenticated),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        self.establish(self.api.login(email, password), "Login failed")
            .await
    }

    /// Registers and signs in; there is no separate login step afterwards.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        self.establish(self.api.register(request), "Registration failed")
            .await
    }

    /// Drops the credential and every session field. Never fails.
    pub fn logout(&self) {
        self.api.clear_tokens();
        self.state.send_replace(SessionState::default());
        self.api.metrics().session_authenticated.set(0);

        if let Err(err) = self.storage.clear() {
            warn!(error = %err, "failed to clear persisted session");
        }

        info!("logged out");
    }

    pub async fn refresh_user(&self) -> Result<(), ClientError> {
        match self.api.current_user().await {
            Ok(user) => {
                self.state.send_modify(|state| state.user = Some(user));
                self.persist();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "current user unavailable; session marked unauthenticated");
                self.state
                    .send_modify(|state| state.is_authenticated = false);
                self.api.metrics().session_authenticated.set(0);
                Err(err)
            }
        }
    }

    /// Installs a rotated token pair into the transport and the store.
    pub fn set_tokens(&self, tokens: TokenPair) {
        self.api.set_tokens(tokens.clone());
        self.state.send_modify(|state| {
            state.access_token = Some(tokens.access);
            state.refresh_token = Some(tokens.refresh);
            state.is_authenticated = true;
        });
        self.api.metrics().session_authenticated.set(1);
        self.persist();
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    async fn establish<F>(&self, exchange: F, default_message: &str) -> Result<(), ClientError>
    where
        F: Future<Output = Result<TokenPair, ClientError>>,
    {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let previous = self.api.tokens();
        let mut installed = None;

        let outcome = async {
            let tokens = exchange.await?;
            self.api.set_tokens(tokens.clone());
            installed = Some(tokens.clone());
            let user = self.api.current_user().await?;
            Ok::<_, ClientError>((tokens, user))
        }
        .await;

        match outcome {
            Ok((tokens, user)) => {
                info!(user_id = %user.id, role = %user.role, "session established");
                self.state.send_modify(|state| {
                    state.user = Some(user);
                    state.access_token = Some(tokens.access);
                    state.refresh_token = Some(tokens.refresh);
                    state.is_authenticated = true;
                    state.is_loading = false;
                });
                self.api.metrics().session_authenticated.set(1);
                self.persist();
                Ok(())
            }
            Err(err) => {
                // A logout or token rotation during the attempt owns the
                // credential now.
                if let Some(installed) = &installed {
                    self.api.replace_tokens_if(installed, previous);
                }
                let message = err.user_message(default_message);
                warn!(error = %err, reason = %message, "authentication failed");
                self.state.send_modify(|state| {
                    state.error = Some(message);
                    state.is_loading = false;
                });
                Err(err)
            }
        }
    }

    fn persist(&self) {
        let persisted = self.state.borrow().persisted();
        if let Err(err) = self.storage.save(&persisted) {
            warn!(error = %err, "failed to persist session");
        }
    }
}
