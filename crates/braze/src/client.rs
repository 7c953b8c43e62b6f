use actions_core::{ActionError, ActionResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session-bound Braze web SDK handle.
pub trait BrazeClient {
    /// Whether the SDK has been initialized for this session.
    fn ready(&self) -> bool;

    /// Attach a purchase to the current session. Returns `false` when the SDK
    /// refused it.
    fn log_purchase(
        &self,
        product_id: &str,
        price: f64,
        currency: &str,
        quantity: f64,
        properties: &Map<String, Value>,
    ) -> bool;
}

/// SDK initialization settings for the Braze destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrazeSettings {
    pub api_key: String,
    /// SDK endpoint host, e.g. `sdk.iad-01.braze.com`.
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<String>,
}

impl BrazeSettings {
    pub fn validate(&self) -> ActionResult<()> {
        if self.api_key.is_empty() {
            return Err(ActionError::Config("Braze api_key must not be empty".into()));
        }
        if self.endpoint.is_empty() {
            return Err(ActionError::Config("Braze endpoint must not be empty".into()));
        }
        Ok(())
    }
}

impl From<&actions_core::config::BrazeConfig> for BrazeSettings {
    fn from(config: &actions_core::config::BrazeConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            sdk_version: config.sdk_version.clone(),
        }
    }
}
