use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletBalance {
    #[serde(deserialize_with = "crate::models::decimal")]
    pub balance: f64,
    pub currency: String,
}
