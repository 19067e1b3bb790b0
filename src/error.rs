use serde::Deserialize;
use thiserror::Error;

use crate::models::user::Role;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("api error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("realtime error: {0}")]
    Realtime(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not logged in")]
    Unauthenticated,

    #[error("only available to {0} accounts")]
    Forbidden(Role),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// The request was rejected because the bearer token is missing, invalid
    /// or expired.
    pub fn is_stale_session(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Human-readable message for display: the server-supplied message when
    /// one came back, otherwise `default`.
    pub fn user_message(&self, default: &str) -> String {
        match self {
            ClientError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::BadRequest(message) => message.clone(),
            _ => default.to_string(),
        }
    }

    /// Builds an `Api` error from a non-2xx response body.
    pub(crate) fn from_response_body(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message);

        ClientError::Api { status, message }
    }
}

/// Error envelope returned by the backend. Most endpoints put the text in
/// `message`; framework-generated errors use `detail`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .filter(|message| !message.trim().is_empty())
            .or(self.detail)
    }
}
