//! Action traits. An action pairs a static [`ActionDefinition`] with a
//! `perform` step that maps a validated payload onto a destination call.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ActionResult;
use crate::mapping::payload_from_event;
use crate::request::{HttpResponse, Transport};
use crate::types::ActionDefinition;

/// Action that runs against a session-bound SDK client of type `C`.
pub trait BrowserAction<C: ?Sized>: Send + Sync {
    type Settings;
    type Payload: DeserializeOwned;

    fn definition(&self) -> &ActionDefinition;

    fn perform(
        &self,
        client: &C,
        settings: &Self::Settings,
        payload: Self::Payload,
    ) -> ActionResult<()>;

    /// Extract the payload from a raw event and perform the action.
    fn run(
        &self,
        client: &C,
        settings: &Self::Settings,
        event: &Value,
        overrides: Option<&Map<String, Value>>,
    ) -> ActionResult<()> {
        let payload = payload_from_event(self.definition(), event, overrides)?;
        self.perform(client, settings, payload)
    }
}

/// Action that runs server-side through a [`Transport`].
#[async_trait]
pub trait CloudAction: Send + Sync {
    type Settings: Sync;
    type Payload: DeserializeOwned + Send;

    fn definition(&self) -> &ActionDefinition;

    async fn perform(
        &self,
        transport: &dyn Transport,
        settings: &Self::Settings,
        payload: Self::Payload,
    ) -> ActionResult<HttpResponse>;

    /// Extract the payload from a raw event and perform the action.
    async fn run(
        &self,
        transport: &dyn Transport,
        settings: &Self::Settings,
        event: &Value,
        overrides: Option<&Map<String, Value>>,
    ) -> ActionResult<HttpResponse> {
        let payload = payload_from_event(self.definition(), event, overrides)?;
        self.perform(transport, settings, payload).await
    }
}
