//! REST API client module for the attendance backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! studio's HTTP JSON API. Every resource is addressed through a single
//! endpoint with a `path` query parameter (`?path=athletes`, ...).
//!
//! The API carries no authentication.

pub mod client;
pub mod error;

pub use client::{ApiClient, Resource};
pub use error::ApiError;
