use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::wallet::WalletBalance;

const BALANCE_PATH: &str = "/wallets/balance/";

impl ApiClient {
    pub async fn wallet_balance(&self) -> Result<WalletBalance, ClientError> {
        self.get(BALANCE_PATH).await
    }
}
