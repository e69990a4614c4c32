//! Error types shared across the session lifecycle.
//!
//! `AuthError` is what collaborators see. Its `Display` text is the
//! human-readable message stored in `SessionState::error` after a failed
//! sign-in. `StorageError` never leaves the store: it is logged and absorbed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid password. Please try again.")]
    InvalidCredentials,

    #[error("User not found. Please check your email address.")]
    UnknownUser,

    #[error("Account is inactive. Please contact support.")]
    AccountInactive,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    #[error("Session manager has been shut down")]
    Disposed,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_messages_are_user_facing() {
        assert_eq!(
            AuthError::UnknownUser.to_string(),
            "User not found. Please check your email address."
        );
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid password. Please try again."
        );
        assert_eq!(
            AuthError::AccountInactive.to_string(),
            "Account is inactive. Please contact support."
        );
    }

    #[test]
    fn test_storage_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "quota");
        let err: AuthError = StorageError::from(io).into();
        assert!(matches!(err, AuthError::Storage(StorageError::Io(_))));
    }
}
