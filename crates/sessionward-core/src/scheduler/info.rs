use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::SessionState;
use crate::utils::{minutes_to_millis, round_minutes, to_datetime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenewalStatus {
    Expired,
    RefreshDue,
    Active,
}

impl RenewalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RenewalStatus::Expired => "expired",
            RenewalStatus::RefreshDue => "refresh-due",
            RenewalStatus::Active => "active",
        }
    }
}

/// Renewal diagnostics derived from the state and the clock.
///
/// Nothing here is stored; every field is recomputed from `token_expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalInfo {
    pub expires_at: i64,
    pub refresh_at: i64,
    pub minutes_until_expiry: i64,
    pub minutes_until_refresh: i64,
    pub status: RenewalStatus,
}

impl RenewalInfo {
    /// `None` when signed out or when no expiry is known
    pub fn compute(state: &SessionState, margin_minutes: i64, now: i64) -> Option<Self> {
        if !state.is_authenticated {
            return None;
        }
        let expires_at = state.token_expires_at()?;
        let refresh_at = expires_at.saturating_sub(minutes_to_millis(margin_minutes));

        let status = if now >= expires_at {
            RenewalStatus::Expired
        } else if now >= refresh_at {
            RenewalStatus::RefreshDue
        } else {
            RenewalStatus::Active
        };

        Some(Self {
            expires_at,
            refresh_at,
            minutes_until_expiry: round_minutes(expires_at.saturating_sub(now)),
            minutes_until_refresh: round_minutes(refresh_at.saturating_sub(now).max(0)),
            status,
        })
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.expires_at)
    }

    pub fn refresh_at_utc(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.refresh_at)
    }
}
