//! Data models for an authenticated session.
//!
//! - `User`, `UserUpdate`: the signed-in profile and partial updates to it
//! - `TokenPair`: access/refresh tokens with their absolute expiry

pub mod tokens;
pub mod user;

pub use tokens::{TokenPair, DEFAULT_LIFETIME_MINUTES, DEFAULT_TOKEN_TYPE};
pub use user::{display_name, user_initials, User, UserUpdate};
