//! # VoiceDash Infrastructure
//!
//! I/O side of the VoiceDash API client.
//!
//! This crate contains:
//! - The authenticated API client (token gate, single-flight refresh)
//! - Login/logout/hydration on top of it
//! - The HTTP transport
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements the boundaries defined in `voicedash-common`
//! - Depends on `voicedash-domain` for configuration and session types

pub mod api;
pub mod config;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{
    ApiError, ApiErrorCategory, ApiRequest, ApiResponse, AuthService, AuthenticatedHttpClient,
};
pub use http::{HttpClient, HttpClientBuilder};
