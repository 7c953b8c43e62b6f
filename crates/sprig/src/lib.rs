//! Sprig cloud destination.

pub mod identify_user;

use actions_core::{ActionError, ActionResult};
use serde::{Deserialize, Serialize};

pub use identify_user::IdentifyUser;

/// Per-destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprigSettings {
    pub api_key: String,
}

impl SprigSettings {
    pub fn validate(&self) -> ActionResult<()> {
        if self.api_key.is_empty() {
            return Err(ActionError::Config("Sprig api_key must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings() {
        let settings: SprigSettings =
            serde_json::from_value(serde_json::json!({"apiKey": "k"})).unwrap();
        assert_eq!(settings.api_key, "k");
        assert!(settings.validate().is_ok());

        let empty = SprigSettings {
            api_key: String::new(),
        };
        assert!(empty.validate().is_err());
    }
}
