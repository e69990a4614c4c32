//! Session lifecycle manager.
//!
//! Owns the `SessionState`, persists every transition through the
//! `SessionStore` before publishing it, and talks to the credential verifier.
//! State is published on a `tokio::sync::watch` channel; every transition is
//! applied under the channel's write lock, so readers never see half of one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::credentials::Credentials;
use super::session::{reduce, SessionAction, SessionState};
use crate::error::AuthError;
use crate::models::{UserUpdate, DEFAULT_LIFETIME_MINUTES};
use crate::store::SessionStore;
use crate::utils::now_millis;
use crate::verifier::CredentialVerifier;

pub struct SessionManager {
    store: SessionStore,
    verifier: Arc<dyn CredentialVerifier>,
    state: watch::Sender<SessionState>,
    default_lifetime_minutes: i64,
    alive: AtomicBool,
}

impl SessionManager {
    pub fn new(store: SessionStore, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            store,
            verifier,
            state,
            default_lifetime_minutes: DEFAULT_LIFETIME_MINUTES,
            alive: AtomicBool::new(true),
        }
    }

    /// Lifetime applied when the verifier does not report one
    pub fn with_default_lifetime(mut self, minutes: i64) -> Self {
        self.default_lifetime_minutes = minutes;
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published transition
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn dispatch(&self, action: SessionAction) {
        self.state.send_modify(|state| {
            *state = reduce(std::mem::take(state), action);
        });
    }

    // =========================================================================
    // Lifetime
    // =========================================================================

    /// Stop accepting verifier results.
    ///
    /// Calls already waiting on the verifier are not cancelled, but whatever
    /// they return afterwards is dropped without touching state or storage.
    pub fn dispose(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            debug!("Session manager disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        !self.alive.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Restore the persisted session, if it is still valid
    pub fn initialize(&self) {
        let restored = self.store.load();
        debug!(restored = restored.is_authenticated, "Session initialized");
        self.dispatch(SessionAction::Initialize(restored));
    }

    /// Verify credentials and start a session.
    ///
    /// On failure the previous session (if any) is kept and the verifier's
    /// message is stored in `error`.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.dispatch(SessionAction::SignInStarted);

        let result = self
            .verifier
            .login(&credentials.email, &credentials.password)
            .await;

        if self.is_disposed() {
            debug!("Discarding sign-in result after dispose");
            return Err(AuthError::Disposed);
        }

        match result {
            Ok(grant) => {
                let tokens = grant.token_pair(now_millis(), self.default_lifetime_minutes);
                let mut user = grant.user;
                user.token_expires_at = Some(tokens.expires_at);

                self.store.save(&tokens, &user);
                info!(user_id = %user.id, expires_at = tokens.expires_at, "Signed in");
                self.dispatch(SessionAction::SignInSuccess { tokens, user });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.dispatch(SessionAction::SetError(Some(e.to_string())));
                Err(e)
            }
        }
    }

    /// Drop the session from memory and storage. Always succeeds.
    pub fn sign_out(&self) {
        self.store.clear();
        self.dispatch(SessionAction::SignOut);
        info!("Signed out");
    }

    /// Merge `update` into the current user; no-op when signed out
    pub fn update_user(&self, update: UserUpdate) {
        let merged = match self.state.borrow().user {
            Some(ref user) => user.merged(update),
            None => {
                debug!("Ignoring user update without a session");
                return;
            }
        };

        self.store.update_user(&merged);
        self.dispatch(SessionAction::UpdateUser(merged));
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// Any verifier failure signs the session out: a session that cannot be
    /// refreshed is not kept around in a degraded state.
    pub async fn refresh_token(&self) -> Result<(), AuthError> {
        let refresh_token = match self.state.borrow().refresh_token() {
            Some(token) => token.to_string(),
            None => return Err(AuthError::NotAuthenticated),
        };

        self.dispatch(SessionAction::SetLoading(true));
        debug!("Refreshing token");

        let result = self.verifier.refresh(&refresh_token).await;

        if self.is_disposed() {
            debug!("Discarding refresh result after dispose");
            return Err(AuthError::Disposed);
        }

        match result {
            Ok(grant) => {
                let current_user = self.state.borrow().user.clone();
                let Some(mut user) = current_user else {
                    // Signed out while the refresh was in flight
                    self.dispatch(SessionAction::SetLoading(false));
                    return Err(AuthError::NotAuthenticated);
                };

                let tokens = grant.token_pair(now_millis(), self.default_lifetime_minutes);
                user.token_expires_at = Some(tokens.expires_at);

                self.store.save(&tokens, &user);
                info!(expires_at = tokens.expires_at, "Token refreshed");
                self.dispatch(SessionAction::RefreshSuccess { tokens, user });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, signing out");
                self.sign_out();
                Err(AuthError::RefreshFailed(e.to_string()))
            }
        }
    }

    pub fn clear_error(&self) {
        self.dispatch(SessionAction::SetError(None));
    }
}
