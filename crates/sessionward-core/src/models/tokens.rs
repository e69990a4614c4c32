use serde::{Deserialize, Serialize};

use crate::utils::{minutes_to_millis, round_minutes};

/// Token type label used when the verifier does not supply one
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Session lifetime in minutes when the verifier does not specify one
pub const DEFAULT_LIFETIME_MINUTES: i64 = 60;

/// Window used by `is_expiring_soon` when callers have no preference
pub const EXPIRING_SOON_THRESHOLD_MINUTES: i64 = 5;

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

/// Access and refresh token issued together.
///
/// `expires_at` is fixed at issuance (`issued_at + expires_in` minutes) and is
/// never recomputed; a refresh replaces the whole pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in minutes
    pub expires_in: i64,
    /// Absolute expiry, milliseconds since the epoch
    pub expires_at: i64,
}

impl TokenPair {
    pub fn issue(
        access_token: String,
        refresh_token: String,
        token_type: Option<String>,
        lifetime_minutes: Option<i64>,
        issued_at: i64,
    ) -> Self {
        let expires_in = lifetime_minutes.unwrap_or(DEFAULT_LIFETIME_MINUTES);
        Self {
            access_token,
            refresh_token,
            token_type: token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(default_token_type),
            expires_in,
            expires_at: issued_at.saturating_add(minutes_to_millis(expires_in)),
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Check if the pair expires within `threshold_minutes` of `now`
    pub fn is_expiring_soon(&self, now: i64, threshold_minutes: i64) -> bool {
        now.saturating_add(minutes_to_millis(threshold_minutes)) > self.expires_at
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: i64) -> i64 {
        round_minutes(self.expires_at.saturating_sub(now)).max(0)
    }

    /// Value for an HTTP `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MS_PER_MINUTE;

    const NOW: i64 = 1_700_000_000_000;

    fn pair(lifetime: Option<i64>) -> TokenPair {
        TokenPair::issue("access".into(), "refresh".into(), None, lifetime, NOW)
    }

    #[test]
    fn test_issue_defaults() {
        let tokens = pair(None);
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 60);
        assert_eq!(tokens.expires_at, NOW + 60 * MS_PER_MINUTE);
    }

    #[test]
    fn test_issue_with_lifetime_and_type() {
        let tokens = TokenPair::issue(
            "a".into(),
            "r".into(),
            Some("MAC".into()),
            Some(8),
            NOW,
        );
        assert_eq!(tokens.token_type, "MAC");
        assert_eq!(tokens.expires_at, NOW + 8 * MS_PER_MINUTE);
        assert_eq!(tokens.authorization_header(), "MAC a");
    }

    #[test]
    fn test_is_expired_boundary() {
        let tokens = pair(Some(10));
        assert!(!tokens.is_expired(tokens.expires_at));
        assert!(tokens.is_expired(tokens.expires_at + 1));
    }

    #[test]
    fn test_is_expiring_soon() {
        let tokens = pair(Some(10));
        assert!(!tokens.is_expiring_soon(NOW, EXPIRING_SOON_THRESHOLD_MINUTES));
        assert!(tokens.is_expiring_soon(NOW + 6 * MS_PER_MINUTE, EXPIRING_SOON_THRESHOLD_MINUTES));
    }

    #[test]
    fn test_minutes_until_expiry_clamps() {
        let tokens = pair(Some(10));
        assert_eq!(tokens.minutes_until_expiry(NOW), 10);
        assert_eq!(tokens.minutes_until_expiry(NOW + 20 * MS_PER_MINUTE), 0);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(pair(None)).expect("serialize tokens");
        assert_eq!(json["accessToken"], "access");
        assert_eq!(json["refreshToken"], "refresh");
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 60);

        let parsed: TokenPair = serde_json::from_str(
            r#"{"accessToken":"a","refreshToken":"r","expiresIn":5,"expiresAt":42}"#,
        )
        .expect("tokenType is optional");
        assert_eq!(parsed.token_type, "Bearer");
    }
}
