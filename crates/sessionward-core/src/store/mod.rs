//! Persistent session storage.
//!
//! This module provides:
//! - `StorageBackend`: a string key-value store (memory, JSON files, OS keychain)
//! - `SessionStore`: the token pair, user and authenticated marker on top of a
//!   backend, with lazy expiry on load
//!
//! Storage is best effort. Faults are logged and swallowed so a full disk or a
//! locked keychain never takes the session down with it.

pub mod backend;
pub mod keychain;
pub mod session_store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use keychain::KeyringBackend;
pub use session_store::{RestoredSession, SessionStore, DEFAULT_NAMESPACE};
