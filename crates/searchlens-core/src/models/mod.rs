//! Data models for searchlens.
//!
//! This module contains the wire types exchanged with the remote service
//! and the locally stored analysis input:
//!
//! - `Credential`, `RegisterRequest`: request bodies for the auth endpoints
//! - `LoginResponse`, `UserProfile`: login result and the authenticated user
//! - `StoredAnalysis`: brand and keywords submitted for a dashboard analysis

pub mod analysis;
pub mod auth;

pub use analysis::StoredAnalysis;
pub use auth::{Credential, LoginResponse, RegisterRequest, UserProfile, DEFAULT_APP_NAME};
