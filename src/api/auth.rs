use crate::api::{ApiClient, DataEnvelope};
use crate::error::ClientError;
use crate::models::user::{LoginRequest, RegisterRequest, TokenPair, User};

const LOGIN_PATH: &str = "/auth/login/";
const REGISTER_PATH: &str = "/auth/register/";
const CURRENT_USER_PATH: &str = "/auth/user/";

impl ApiClient {
    /// Exchanges credentials for a token pair. Does not install it.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.post(LOGIN_PATH, &request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<TokenPair, ClientError> {
        self.post(REGISTER_PATH, request).await
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        let envelope: DataEnvelope<User> = self.get(CURRENT_USER_PATH).await?;
        Ok(envelope.data)
    }
}
