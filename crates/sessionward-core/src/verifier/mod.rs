//! Credential verification.
//!
//! The session manager talks to whatever issues tokens through the
//! `CredentialVerifier` trait:
//! - `MockVerifier`: in-memory demo accounts with simulated latency
//! - `HttpVerifier`: JSON API over HTTPS
//!
//! Both produce a `LoginGrant`, which the manager turns into a `TokenPair`
//! and the effective `User`.

pub mod error;
pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AuthError;
use crate::models::{TokenPair, User};

pub use error::ApiError;
pub use http::HttpVerifier;
pub use mock::{demo_accounts, MockAccount, MockVerifier};

/// Tokens and profile handed out by a successful login or refresh
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub access_token: String,
    pub token_type: Option<String>,
    pub refresh_token: String,
    pub user: User,
    /// Lifetime in minutes; `None` means the default lifetime applies
    pub expires_in: Option<i64>,
}

impl LoginGrant {
    /// Build the token pair this grant describes, issued at `issued_at`
    pub fn token_pair(&self, issued_at: i64, default_lifetime_minutes: i64) -> TokenPair {
        TokenPair::issue(
            self.access_token.clone(),
            self.refresh_token.clone(),
            self.token_type.clone(),
            Some(self.expires_in.unwrap_or(default_lifetime_minutes)),
            issued_at,
        )
    }
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<LoginGrant, AuthError>;
}

// ============================================================================
// Wire format
// ============================================================================

/// Response envelope shared by the login and refresh endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub auth: AuthToken,
    pub refresh: String,
    #[serde(rename = "userState")]
    pub user_state: User,
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthToken {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
}

impl From<LoginData> for LoginGrant {
    fn from(data: LoginData) -> Self {
        Self {
            access_token: data.auth.token,
            token_type: data.auth.token_type,
            refresh_token: data.refresh,
            user: data.user_state,
            expires_in: data.expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MS_PER_MINUTE;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"success":true,"message":"Login successful!","data":{"auth":{"token":"mock_token_1_a","type":"Bearer"},"refresh":"mock_refresh_1_a","userState":{"id":"user-3","email":"jane@example.com","name":"Jane Smith","roles":["manager","user"],"department":"Marketing","status":"active"},"expiresIn":60}}"#;

        let resp: LoginResponse = serde_json::from_str(json).expect("parse login response");
        assert!(resp.success);
        let grant = LoginGrant::from(resp.data.expect("data present"));
        assert_eq!(grant.access_token, "mock_token_1_a");
        assert_eq!(grant.user.roles, vec!["manager", "user"]);
        assert_eq!(grant.user.extra["status"], "active");
        assert_eq!(grant.expires_in, Some(60));
    }

    #[test]
    fn test_parse_failure_response() {
        let json = r#"{"success":false,"message":"Invalid password. Please try again."}"#;
        let resp: LoginResponse = serde_json::from_str(json).expect("parse failure response");
        assert!(!resp.success);
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_token_pair_uses_default_lifetime() {
        let grant = LoginGrant {
            access_token: "a".into(),
            token_type: None,
            refresh_token: "r".into(),
            user: serde_json::from_str(r#"{"id":"1","email":"e","name":"n"}"#).unwrap(),
            expires_in: None,
        };
        let tokens = grant.token_pair(1_000, 60);
        assert_eq!(tokens.expires_in, 60);
        assert_eq!(tokens.expires_at, 1_000 + 60 * MS_PER_MINUTE);
        assert_eq!(tokens.token_type, "Bearer");
    }
}
