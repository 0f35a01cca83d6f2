//! REST API client module for the searchlens service.
//!
//! This module provides the `ApiClient` through which every request is
//! sent, and the `AuthGateway` built on it for the login and registration
//! endpoints.
//!
//! The API uses bearer token authentication; the token is read from the
//! shared `TokenStore` on every dispatch.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::{AuthGateway, AuthResult};
