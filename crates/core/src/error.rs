use crate::model::ElementId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A requested change could not be applied to the backing text.
    #[error("Source error: {0}")]
    Structural(String),
    #[error("Element {0} is no longer valid")]
    InvalidElement(ElementId),
    #[error("Match contract violated: {0}")]
    MatchContract(String),
    #[error("Parsing error: {0}")]
    Parse(String),
    #[error("Scheduled reparse was cancelled")]
    Cancelled,
    #[error("Blocking wait requested from inside the synchronization runtime")]
    Reentrant,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    pub fn structural(message: impl Into<String>) -> Self {
        SyncError::Structural(message.into())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Json(err.to_string())
    }
}

impl From<srcsync_api::ApiError> for SyncError {
    fn from(err: srcsync_api::ApiError) -> Self {
        SyncError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
