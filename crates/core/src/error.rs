use thiserror::Error;

pub type ActionResult<T> = Result<T, ActionError>;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Payload validation error: {0}")]
    Validation(String),

    #[error("Subscription parse error: {0}")]
    Subscription(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ActionError {
    /// Status code carried by an HTTP failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ActionError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
