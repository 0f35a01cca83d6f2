//! Authentication module for token storage and the user session.
//!
//! This module provides:
//! - `TokenStore`: the durable slot for the current bearer token, with
//!   file, keychain and in-memory backends
//! - `SessionManager`: the login/register/logout state machine exposed to
//!   the front end
//!
//! The token survives restarts; the user profile lives only in memory.

pub mod keychain;
pub mod session;
pub mod store;

pub use keychain::KeyringTokenStore;
pub use session::{SessionManager, SessionSnapshot, SessionState};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
