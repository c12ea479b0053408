//! Shared error type across parlor crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Wire text that does not decode into an envelope.
    MalformedEnvelope,
    /// Invalid input / contract misuse by the client.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in outbound notices.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::MalformedEnvelope => "MALFORMED_ENVELOPE",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ParlorError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum ParlorError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ParlorError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ParlorError::MalformedEnvelope(_) => ClientCode::MalformedEnvelope,
            ParlorError::BadRequest(_) => ClientCode::BadRequest,
            ParlorError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            ParlorError::Internal(_) => ClientCode::Internal,
        }
    }
}
