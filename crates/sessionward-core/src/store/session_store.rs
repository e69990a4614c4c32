use std::sync::Arc;

use tracing::{debug, warn};

use super::StorageBackend;
use crate::error::StorageError;
use crate::models::{TokenPair, User};
use crate::utils::now_millis;

/// Key prefix used when the application does not choose one
pub const DEFAULT_NAMESPACE: &str = "sessionward";

/// Marker value written under the authenticated key
const AUTHENTICATED_MARKER: &str = "true";

/// Result of `SessionStore::load`.
///
/// Either all three fields are populated (`is_authenticated == true`) or
/// none are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoredSession {
    pub tokens: Option<TokenPair>,
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl RestoredSession {
    fn restored(tokens: TokenPair, user: User) -> Self {
        Self {
            tokens: Some(tokens),
            user: Some(user),
            is_authenticated: true,
        }
    }
}

struct StorageKeys {
    tokens: String,
    user: String,
    authenticated: String,
}

impl StorageKeys {
    fn new(namespace: &str) -> Self {
        Self {
            tokens: format!("{}_tokens", namespace),
            user: format!("{}_user", namespace),
            authenticated: format!("{}_auth", namespace),
        }
    }
}

/// Persists the current session under three namespaced keys.
///
/// None of the methods fail outward. A storage or serialization fault is
/// logged and the call degrades to a no-op (or an empty load).
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
    keys: StorageKeys,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn StorageBackend>, namespace: &str) -> Self {
        Self {
            backend,
            keys: StorageKeys::new(namespace),
        }
    }

    /// Write tokens, user and the authenticated marker, replacing prior values
    pub fn save(&self, tokens: &TokenPair, user: &User) {
        if let Err(e) = self.try_save(tokens, user) {
            warn!(error = %e, "Failed to save session");
        }
    }

    fn try_save(&self, tokens: &TokenPair, user: &User) -> Result<(), StorageError> {
        let tokens = serde_json::to_string(tokens)?;
        let user = serde_json::to_string(user)?;
        self.backend.set(&self.keys.tokens, &tokens)?;
        self.backend.set(&self.keys.user, &user)?;
        self.backend.set(&self.keys.authenticated, AUTHENTICATED_MARKER)?;
        Ok(())
    }

    /// Read the persisted session.
    ///
    /// Expired or unreadable sessions are cleared from storage and reported
    /// as empty.
    pub fn load(&self) -> RestoredSession {
        self.load_at(now_millis())
    }

    fn load_at(&self, now: i64) -> RestoredSession {
        match self.try_load(now) {
            Ok(Some(session)) => session,
            Ok(None) => RestoredSession::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load session, discarding it");
                self.clear();
                RestoredSession::default()
            }
        }
    }

    fn try_load(&self, now: i64) -> Result<Option<RestoredSession>, StorageError> {
        let marker = self.backend.get(&self.keys.authenticated)?;
        let tokens = self.backend.get(&self.keys.tokens)?;
        let user = self.backend.get(&self.keys.user)?;

        let (Some(marker), Some(tokens), Some(user)) = (marker, tokens, user) else {
            return Ok(None);
        };
        if marker != AUTHENTICATED_MARKER {
            return Ok(None);
        }

        let tokens: TokenPair = serde_json::from_str(&tokens)?;
        let user: User = serde_json::from_str(&user)?;

        if tokens.is_expired(now) {
            debug!(expires_at = tokens.expires_at, "Stored session expired");
            self.clear();
            return Ok(None);
        }

        Ok(Some(RestoredSession::restored(tokens, user)))
    }

    /// Replace only the user record
    pub fn update_user(&self, user: &User) {
        let result = serde_json::to_string(user)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.set(&self.keys.user, &json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to update stored user");
        }
    }

    /// Remove all three keys. Clearing an empty store is a no-op.
    pub fn clear(&self) {
        for key in [&self.keys.authenticated, &self.keys.tokens, &self.keys.user] {
            if let Err(e) = self.backend.remove(key) {
                warn!(key = %key, error = %e, "Failed to clear stored session key");
            }
        }
    }

    pub fn has_tokens(&self) -> bool {
        match self.backend.get(&self.keys.tokens) {
            Ok(value) => value.is_some(),
            Err(e) => {
                debug!(error = %e, "Failed to check for stored tokens");
                false
            }
        }
    }
}
