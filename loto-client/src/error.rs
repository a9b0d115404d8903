//! Backend call failures
//!
//! Every HTTP status the restaurant backend answers with maps to one variant,
//! so flows can decide between "log in again", "show the message" and "retry".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connect, timeout or body read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 2xx whose body is not the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authenticated call attempted with no session
    #[error("Token not provided")]
    MissingToken,

    /// 401: token expired or revoked
    #[error("Session rejected by the backend")]
    Unauthorized,

    /// `/auth/login` said no (401, 400 or `ok: false`)
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// 403, e.g. a camarero calling an admin endpoint
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404 with the backend's message
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400
    #[error("Rejected by the backend: {0}")]
    Validation(String),

    /// Any other non-success status
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// The stored session can no longer be used
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::MissingToken)
    }

    /// Worth retrying as-is: transport trouble or a 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            ClientError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(ClientError::Unauthorized.is_auth());
        assert!(ClientError::MissingToken.is_auth());
        assert!(!ClientError::Forbidden("admin".into()).is_auth());

        let outage = ClientError::Server {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(outage.is_transient());
        assert!(!ClientError::Validation("cantidad".into()).is_transient());
        assert!(!ClientError::Unauthorized.is_transient());
    }
}
