use thiserror::Error;

/// Errors that can occur while looking up a secret
#[derive(Debug, Error)]
pub enum SecretError {
    /// Secret path does not exist in the store
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// Backend runtime error (transport, auth, missing executable)
    #[error("{backend} error: {message}")]
    BackendError { backend: String, message: String },

    /// Backend answered but the payload could not be understood
    #[error("Invalid response for '{path}': {message}")]
    InvalidResponse { path: String, message: String },
}

impl SecretError {
    /// Create a backend error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendError {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            path: path.into(),
            message: message.into(),
        }
    }
}
