pub mod action;
pub mod config;
pub mod error;
pub mod mapping;
pub mod request;
pub mod subscription;
pub mod transform;
pub mod types;

pub use action::{BrowserAction, CloudAction};
pub use config::AppConfig;
pub use error::{ActionError, ActionResult};
pub use request::{HttpMethod, HttpResponse, ReqwestTransport, RequestOptions, Transport};
pub use subscription::Subscription;
pub use types::{
    ActionDefinition, DefaultBinding, FieldDescriptor, FieldSchema, Identifier, Platform,
    ValueKind,
};
