pub mod delivery;
pub mod notification;
pub mod shipment;
pub mod user;
pub mod wallet;

use serde::{Deserialize, Deserializer};

/// Decimal fields arrive either as JSON numbers or as strings like `"12.50"`.
pub(crate) fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}
