//! In-memory credential verifier for demos and tests.
//!
//! Holds a small account directory and answers after a simulated network
//! delay. Refresh accepts any token and issues a fresh pair.

use std::time::Duration;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{Map, Value};
use tracing::debug;

use super::{CredentialVerifier, LoginGrant};
use crate::error::AuthError;
use crate::models::{User, DEFAULT_TOKEN_TYPE};
use crate::utils::now_millis;

/// Simulated login round trip
pub const DEFAULT_LOGIN_LATENCY: Duration = Duration::from_millis(800);

/// Simulated refresh round trip
pub const DEFAULT_REFRESH_LATENCY: Duration = Duration::from_millis(500);

/// Lifetime of every pair the mock issues, in minutes
const MOCK_LIFETIME_MINUTES: i64 = 60;

/// Length of the random suffix on generated tokens
const TOKEN_SUFFIX_LENGTH: usize = 6;

#[derive(Debug, Clone)]
pub struct MockAccount {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub roles: Vec<String>,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub active: bool,
}

impl MockAccount {
    pub fn new(id: &str, email: &str, password: &str, name: &str, roles: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            avatar: None,
            department: None,
            active: true,
        }
    }

    pub fn with_department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    pub fn with_avatar(mut self, avatar: &str) -> Self {
        self.avatar = Some(avatar.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    fn status(&self) -> &'static str {
        if self.active {
            "active"
        } else {
            "inactive"
        }
    }

    fn profile(&self) -> User {
        let mut extra = Map::new();
        if let Some(ref avatar) = self.avatar {
            extra.insert("avatar".to_string(), Value::String(avatar.clone()));
        }
        extra.insert("status".to_string(), Value::String(self.status().to_string()));

        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            roles: self.roles.clone(),
            department: self.department.clone(),
            token_expires_at: None,
            extra,
        }
    }
}

/// The built-in demo directory shown on the sign-in screen
pub fn demo_accounts() -> Vec<MockAccount> {
    vec![
        MockAccount::new("user-1", "admin@example.com", "admin123", "Admin User", &["admin", "user"])
            .with_department("Administration")
            .with_avatar("https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=100&h=100&fit=crop&crop=face"),
        MockAccount::new("user-2", "john@example.com", "john123", "John Doe", &["user"])
            .with_department("Engineering")
            .with_avatar("https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=100&h=100&fit=crop&crop=face"),
        MockAccount::new("user-3", "jane@example.com", "jane123", "Jane Smith", &["manager", "user"])
            .with_department("Marketing")
            .with_avatar("https://images.unsplash.com/photo-1494790108755-2616b612b786?w=100&h=100&fit=crop&crop=face"),
        MockAccount::new("user-4", "guest@example.com", "guest123", "Guest User", &["guest"])
            .with_department("Guest")
            .with_avatar("https://images.unsplash.com/photo-1535713875002-d1d0cf377fde?w=100&h=100&fit=crop&crop=face"),
    ]
}

fn generate_token(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{}_{}_{}", prefix, now_millis(), suffix.to_lowercase())
}

pub struct MockVerifier {
    accounts: Vec<MockAccount>,
    login_latency: Duration,
    refresh_latency: Duration,
    lifetime_minutes: i64,
}

impl Default for MockVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVerifier {
    /// Verifier over the demo directory with default latencies
    pub fn new() -> Self {
        Self::with_accounts(demo_accounts())
    }

    pub fn with_accounts(accounts: Vec<MockAccount>) -> Self {
        Self {
            accounts,
            login_latency: DEFAULT_LOGIN_LATENCY,
            refresh_latency: DEFAULT_REFRESH_LATENCY,
            lifetime_minutes: MOCK_LIFETIME_MINUTES,
        }
    }

    pub fn with_latency(mut self, login: Duration, refresh: Duration) -> Self {
        self.login_latency = login;
        self.refresh_latency = refresh;
        self
    }

    /// Lifetime reported with every grant
    pub fn with_lifetime(mut self, minutes: i64) -> Self {
        self.lifetime_minutes = minutes;
        self
    }

    pub fn accounts(&self) -> &[MockAccount] {
        &self.accounts
    }

    fn find(&self, email: &str) -> Option<&MockAccount> {
        self.accounts
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(email))
    }

    fn grant_for(&self, user: User) -> LoginGrant {
        LoginGrant {
            access_token: generate_token("mock_token"),
            token_type: Some(DEFAULT_TOKEN_TYPE.to_string()),
            refresh_token: generate_token("mock_refresh"),
            user,
            expires_in: Some(self.lifetime_minutes),
        }
    }

    async fn simulate_latency(latency: Duration) {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CredentialVerifier for MockVerifier {
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, AuthError> {
        Self::simulate_latency(self.login_latency).await;

        let account = self.find(email).ok_or(AuthError::UnknownUser)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        if !account.active {
            return Err(AuthError::AccountInactive);
        }

        debug!(user_id = %account.id, "Mock login accepted");
        Ok(self.grant_for(account.profile()))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<LoginGrant, AuthError> {
        Self::simulate_latency(self.refresh_latency).await;

        // Real services derive the profile from the token; the mock always
        // answers for the first account.
        let account = self
            .accounts
            .first()
            .ok_or_else(|| AuthError::RefreshFailed("no accounts configured".to_string()))?;
        Ok(self.grant_for(account.profile()))
    }
}
