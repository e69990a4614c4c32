use serde::{Deserialize, Serialize};

use crate::models::{TokenPair, User};
use crate::store::RestoredSession;

/// Authentication state observed by the UI.
///
/// The initial value is "unauthenticated, loading": nothing has been restored
/// yet. `error` is orthogonal to the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<User>,
    pub tokens: Option<TokenPair>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            tokens: None,
            is_authenticated: false,
            is_loading: true,
            error: None,
        }
    }
}

impl SessionState {
    /// Check the authenticated flag against the clock.
    ///
    /// `is_authenticated` is only updated on transitions; this is the lazy
    /// read-time check that also requires unexpired tokens.
    pub fn is_session_valid(&self, now: i64) -> bool {
        self.is_authenticated
            && self.user.is_some()
            && self.tokens.as_ref().is_some_and(|t| !t.is_expired(now))
    }

    /// Refresh token of the current pair, if any
    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.refresh_token.as_str())
    }

    /// Expiry the renewal scheduler tracks
    pub fn token_expires_at(&self) -> Option<i64> {
        self.user.as_ref().and_then(|u| u.token_expires_at)
    }
}

/// Every transition the session can make
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Restore result from the store; always ends loading
    Initialize(RestoredSession),
    /// A sign-in has been submitted
    SignInStarted,
    SignInSuccess { tokens: TokenPair, user: User },
    SignOut,
    UpdateUser(User),
    SetLoading(bool),
    /// Set or clear the error; always ends loading
    SetError(Option<String>),
    RefreshSuccess { tokens: TokenPair, user: User },
}

/// Apply one action to the state
pub fn reduce(state: SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::Initialize(restored) => SessionState {
            is_authenticated: restored.is_authenticated
                && restored.tokens.is_some()
                && restored.user.is_some(),
            tokens: restored.tokens,
            user: restored.user,
            is_loading: false,
            error: None,
        },
        SessionAction::SignInStarted => SessionState {
            is_loading: true,
            error: None,
            ..state
        },
        SessionAction::SignInSuccess { tokens, user } => SessionState {
            tokens: Some(tokens),
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: None,
        },
        SessionAction::SignOut => SessionState {
            is_loading: false,
            ..SessionState::default()
        },
        SessionAction::UpdateUser(user) => SessionState {
            user: Some(user),
            error: None,
            ..state
        },
        SessionAction::SetLoading(is_loading) => SessionState { is_loading, ..state },
        SessionAction::SetError(error) => SessionState {
            error,
            is_loading: false,
            ..state
        },
        SessionAction::RefreshSuccess { tokens, user } => SessionState {
            tokens: Some(tokens),
            user: Some(user),
            is_loading: false,
            error: None,
            ..state
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{now_millis, MS_PER_MINUTE};
    use serde_json::Map;

    fn user() -> User {
        User {
            id: "user-1".into(),
            email: "admin@example.com".into(),
            name: "Admin User".into(),
            roles: vec!["admin".into(), "user".into()],
            department: None,
            token_expires_at: None,
            extra: Map::new(),
        }
    }

    fn tokens(issued_at: i64) -> TokenPair {
        TokenPair::issue("a".into(), "r".into(), None, Some(60), issued_at)
    }

    fn signed_in() -> SessionState {
        reduce(
            SessionState::default(),
            SessionAction::SignInSuccess {
                tokens: tokens(now_millis()),
                user: user(),
            },
        )
    }

    #[test]
    fn test_initial_state_is_loading_and_signed_out() {
        let state = SessionState::default();
        assert!(state.is_loading);
        assert!(!state.is_authenticated);
        assert!(state.user.is_none() && state.tokens.is_none() && state.error.is_none());
    }

    #[test]
    fn test_initialize_with_empty_restore() {
        let state = reduce(
            SessionState::default(),
            SessionAction::Initialize(RestoredSession::default()),
        );
        assert!(!state.is_loading);
        assert!(!state.is_authenticated);
    }

    #[test]
    fn test_sign_in_success_clears_error() {
        let failed = reduce(
            SessionState::default(),
            SessionAction::SetError(Some("bad password".into())),
        );
        let state = reduce(
            failed,
            SessionAction::SignInSuccess {
                tokens: tokens(now_millis()),
                user: user(),
            },
        );
        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_set_error_preserves_session() {
        let state = reduce(signed_in(), SessionAction::SetError(Some("oops".into())));
        assert!(state.is_authenticated);
        assert!(state.user.is_some());
        assert_eq!(state.error.as_deref(), Some("oops"));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_update_user_clears_error() {
        let failed = reduce(signed_in(), SessionAction::SetError(Some("oops".into())));
        let mut renamed = user();
        renamed.name = "Renamed".into();

        let state = reduce(failed, SessionAction::UpdateUser(renamed));
        assert!(state.error.is_none());
        assert_eq!(state.user.map(|u| u.name).as_deref(), Some("Renamed"));
        assert!(state.is_authenticated);
    }

    #[test]
    fn test_sign_out_resets_and_is_idempotent() {
        let once = reduce(signed_in(), SessionAction::SignOut);
        let twice = reduce(once.clone(), SessionAction::SignOut);
        assert_eq!(once, twice);
        assert!(!once.is_authenticated);
        assert!(!once.is_loading);
        assert!(once.user.is_none() && once.tokens.is_none());
    }

    #[test]
    fn test_refresh_success_replaces_pair() {
        let before = signed_in();
        let new_tokens = TokenPair::issue("a2".into(), "r2".into(), None, Some(60), now_millis());
        let mut new_user = user();
        new_user.token_expires_at = Some(new_tokens.expires_at);

        let loading = reduce(before, SessionAction::SetLoading(true));
        let state = reduce(
            loading,
            SessionAction::RefreshSuccess {
                tokens: new_tokens.clone(),
                user: new_user,
            },
        );
        assert_eq!(state.tokens, Some(new_tokens.clone()));
        assert_eq!(state.token_expires_at(), Some(new_tokens.expires_at));
        assert!(!state.is_loading);
        assert!(state.is_authenticated);
    }

    #[test]
    fn test_is_session_valid_checks_expiry_lazily() {
        let state = signed_in();
        let now = now_millis();
        assert!(state.is_session_valid(now));
        assert!(!state.is_session_valid(now + 61 * MS_PER_MINUTE));
        assert!(!SessionState::default().is_session_valid(now));
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(SessionState::default()).unwrap();
        assert_eq!(json["isAuthenticated"], false);
        assert_eq!(json["isLoading"], true);
    }
}
