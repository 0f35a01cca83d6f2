//! searchlens-core - session and API plumbing for the searchlens dashboard.
//!
//! The crate turns a credential submission into an authorized session,
//! keeps the bearer token across restarts and attaches it to every request:
//!
//! - `auth`: token stores and the `SessionManager` state machine
//! - `api`: the authorized `ApiClient` and the `AuthGateway`
//! - `context`: `AuthContext`, the one place a session is obtained from
//! - `cache`: the analysis input the dashboard renders
//! - `config`: file and environment configuration

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod models;

pub use api::{ApiClient, ApiError, AuthGateway, AuthResult};
pub use auth::{SessionManager, SessionSnapshot, SessionState, TokenStore};
pub use config::Config;
pub use context::AuthContext;
