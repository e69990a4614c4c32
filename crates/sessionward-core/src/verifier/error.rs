use thiserror::Error;

use crate::error::AuthError;

/// Failure talking to the authentication API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Credentials rejected")]
    Unauthorized,

    #[error("Account disabled: {0}")]
    AccountDisabled(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 200;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccountDisabled(truncated),
            404 => ApiError::UnknownAccount(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

impl ApiError {
    /// Classify an unsuccessful response envelope by its message.
    ///
    /// The API reports rejected credentials with the same texts `AuthError`
    /// displays; anything else is an unexpected response.
    pub fn from_message(message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| "request was not successful".to_string());
        if message == AuthError::UnknownUser.to_string() {
            ApiError::UnknownAccount(message)
        } else if message == AuthError::InvalidCredentials.to_string() {
            ApiError::Unauthorized
        } else if message == AuthError::AccountInactive.to_string() {
            ApiError::AccountDisabled(message)
        } else {
            ApiError::InvalidResponse(message)
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::UnknownAccount(_) => AuthError::UnknownUser,
            ApiError::Unauthorized => AuthError::InvalidCredentials,
            ApiError::AccountDisabled(_) => AuthError::AccountInactive,
            other => AuthError::Unavailable(other.to_string()),
        }
    }
}
