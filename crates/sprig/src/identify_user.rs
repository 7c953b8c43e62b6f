//! Identify User: upserts a user and their traits in Sprig.

use actions_core::transform::flatten;
use actions_core::{
    ActionDefinition, ActionResult, CloudAction, FieldDescriptor, FieldSchema, HttpMethod,
    HttpResponse, Identifier, Platform, RequestOptions, Transport, ValueKind,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::SprigSettings;

pub const USERS_ENDPOINT: &str = "https://api.sprig.com/v2/users";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyUserPayload {
    /// Numeric ids are sent as strings.
    pub user_id: Identifier,
    pub attributes: Map<String, Value>,
    /// Any other mapped fields; sent through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct IdentifyUser {
    definition: ActionDefinition,
    endpoint: String,
}

impl IdentifyUser {
    pub fn new() -> Self {
        Self::with_endpoint(USERS_ENDPOINT)
    }

    /// Target a different users endpoint, e.g. a staging host.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let fields = FieldSchema::new(vec![
            FieldDescriptor::new("userId", "User ID", ValueKind::String)
                .description("The userId of the identified user.")
                .required()
                .default_path("$.userId"),
            FieldDescriptor::new("attributes", "Attributes", ValueKind::Object)
                .description("The traits payload to attribute to the userId.")
                .required()
                .default_path("$.traits"),
        ]);

        Self {
            definition: ActionDefinition {
                slug: "identifyUser".to_string(),
                title: "Identify User".to_string(),
                description: "Upserts a user along with any traits to the Sprig platform."
                    .to_string(),
                platform: Platform::Cloud,
                default_subscription: None,
                fields,
            },
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for IdentifyUser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudAction for IdentifyUser {
    type Settings = SprigSettings;
    type Payload = IdentifyUserPayload;

    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn perform(
        &self,
        transport: &dyn Transport,
        settings: &SprigSettings,
        mut payload: IdentifyUserPayload,
    ) -> ActionResult<HttpResponse> {
        payload.attributes = flatten(&payload.attributes);
        debug!(
            user_id = %payload.user_id,
            attributes = payload.attributes.len(),
            "upserting Sprig user"
        );

        let options = RequestOptions::new(HttpMethod::Post)
            .header("Authorization", format!("Bearer {}", settings.api_key))
            .json(serde_json::to_value(&payload)?);

        transport.request(&self.endpoint, options).await
    }
}
