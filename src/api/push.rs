use reqwest::Method;
use tracing::info;

use crate::api::ApiClient;
use crate::error::ClientError;

pub(crate) const DEFAULT_PUSH_TOKEN_PATH: &str = "/courier/api/fcm-token/";

impl ApiClient {
    /// Forwards an opaque device push token to the backend. The token is
    /// passed as the `fcm_token` query parameter; the response body is not
    /// inspected.
    pub async fn register_push_token(&self, token: &str) -> Result<(), ClientError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::BadRequest(
                "push token cannot be empty".to_string(),
            ));
        }

        let url = self.site_url(&self.push_token_path);
        self.send(
            Method::GET,
            url,
            &[("fcm_token", token.to_string())],
            None::<&()>,
        )
        .await?;

        info!("push token registered");
        Ok(())
    }
}
