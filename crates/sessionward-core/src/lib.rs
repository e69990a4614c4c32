//! Session lifecycle core.
//!
//! Owns authentication state for a client application: signs users in through
//! a credential verifier, persists and restores the session, refreshes the
//! token pair before it expires, and signs out when a refresh fails.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sessionward_core::auth::{Credentials, SessionManager};
//! use sessionward_core::scheduler::RenewalScheduler;
//! use sessionward_core::store::{MemoryBackend, SessionStore};
//! use sessionward_core::verifier::MockVerifier;
//!
//! # async fn demo() -> Result<(), sessionward_core::AuthError> {
//! let store = SessionStore::new(Arc::new(MemoryBackend::new()), "demo");
//! let manager = Arc::new(SessionManager::new(store, Arc::new(MockVerifier::new())));
//! manager.initialize();
//! let scheduler = RenewalScheduler::spawn(manager.clone(), 4);
//!
//! manager.sign_in(&Credentials::new("jane@example.com", "jane123")).await?;
//! assert!(manager.state().is_authenticated);
//!
//! scheduler.shutdown().await;
//! manager.dispose();
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod utils;
pub mod verifier;

pub use auth::{Credentials, SessionManager, SessionState};
pub use config::{Config, StorageKind};
pub use error::{AuthError, StorageError};
pub use models::{TokenPair, User, UserUpdate};
pub use scheduler::{RenewalInfo, RenewalScheduler, RenewalStatus};
