//! Proactive token renewal.
//!
//! This module provides:
//! - `RenewalScheduler`: keeps at most one renewal timer armed against the
//!   signed-in user's token expiry
//! - `RenewalInfo`: read-only view of when the token expires and when it will
//!   be refreshed
//!
//! Renewal fires 4 minutes before expiry unless configured otherwise.

pub mod info;
pub mod renewal;

pub use info::{RenewalInfo, RenewalStatus};
pub use renewal::{RenewalScheduler, DEFAULT_REFRESH_MARGIN_MINUTES};
