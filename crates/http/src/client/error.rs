//! Client error types

use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed and could not be recovered by a token refresh
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Caller supplied a value that cannot be sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The server answered with data that fails domain validation
    #[error("Invalid data: {0}")]
    InvalidData(#[from] folio_core::CoreError),

    /// Credential storage could not be read or written
    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),

    /// The shared token refresh failed; the session has been ended
    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[from] RefreshError),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Consume an error response, keeping its body as the message
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        Self::from_status(status, message)
    }

    /// Whether the session is gone and the user has to sign in again
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::RefreshFailed(_))
    }
}

/// Outcome of a failed refresh cycle, delivered to every call waiting on it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token was stored when the cycle started
    #[error("no refresh token stored")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a non-success status
    #[error("refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The refresh request never produced a response
    #[error("refresh request failed: {0}")]
    Transport(String),

    /// The refresh endpoint answered 2xx with an unusable body
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),

    /// The new token could not be persisted
    #[error("could not store refreshed token: {0}")]
    Storage(String),

    /// The task driving the refresh was dropped before it finished
    #[error("refresh abandoned before completion")]
    Abandoned,
}

/// Credential storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage contents: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "nope".into()),
            ClientError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::NOT_FOUND, String::new()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, String::new()),
            ClientError::ServerError { status: 502, .. }
        ));
    }

    #[test]
    fn test_auth_expired_classification() {
        assert!(ClientError::RefreshFailed(RefreshError::Abandoned).is_auth_expired());
        assert!(ClientError::AuthenticationFailed(String::new()).is_auth_expired());
        assert!(!ClientError::Forbidden(String::new()).is_auth_expired());
    }
}
