//! Local storage for the dashboard's analysis input.
//!
//! This module provides the `CacheManager` for storing and retrieving the
//! brand and keywords a user submitted. The dashboard only renders when an
//! input is present; a missing or unreadable input sends the user back to
//! the input step.

pub mod manager;

pub use manager::CacheManager;
