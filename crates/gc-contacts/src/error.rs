//! Error types for gc-contacts

use thiserror::Error;

/// gc-contacts error type
#[derive(Error, Debug)]
pub enum ContactsError {
    #[error("Unauthorized (HTTP 401): {0}")]
    Unauthorized(String),

    #[error("Forbidden (HTTP 403): {0}")]
    Forbidden(String),

    #[error("Contact not found (HTTP 404): {0}")]
    NotFound(String),

    /// The contact changed server-side since it was loaded; re-fetch and
    /// reapply the changes.
    #[error("HTTP 412: Contact Modified Since Load")]
    PreconditionFailed,

    #[error("Client error (HTTP {status}): {body}")]
    ClientError { status: u16, body: String },

    #[error("Server error (HTTP {status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Response contained no contact entry")]
    MissingEntry,

    #[error("Contact is not bound to an API client")]
    Detached,

    #[error("Invalid change for {field}: {reason}")]
    InvalidChange { field: String, reason: String },

    #[error("XML rendering error: {0}")]
    Xml(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] gc_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ContactsError>;
