//! Authentication state and the operations that move it.
//!
//! This module provides:
//! - `SessionState` and `SessionAction`: the state and the pure reducer over it
//! - `SessionManager`: sign-in, sign-out, refresh and user updates, persisted
//!   through a `SessionStore`
//! - Role gates for the presentation layer
//!
//! Sessions are persisted on every transition and tokens live 60 minutes
//! unless the verifier says otherwise.

pub mod credentials;
pub mod gate;
pub mod manager;
pub mod session;

pub use credentials::Credentials;
pub use gate::{guard, guard_at, has_all_roles, has_any_role, has_role, Access, RoleGate};
pub use manager::SessionManager;
pub use session::{reduce, SessionAction, SessionState};
