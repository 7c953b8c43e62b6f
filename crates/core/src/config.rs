use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `DESTINATION_ACTIONS__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sprig: SprigConfig,
    #[serde(default)]
    pub braze: BrazeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SprigConfig {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrazeConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_braze_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub sdk_version: Option<String>,
}

// Default functions
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_user_agent() -> String {
    concat!("destination-actions/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_braze_endpoint() -> String {
    "sdk.iad-01.braze.com".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for BrazeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_braze_endpoint(),
            sdk_version: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("DESTINATION_ACTIONS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
