//! Authenticated backend API client
//!
//! This module provides the HTTP client every dashboard data call goes
//! through. It injects the bearer token, waits for the session on cold
//! start, and recovers from token expiry with one shared refresh.
//!
//! # Architecture
//!
//! ```text
//! caller ──► AuthenticatedHttpClient::execute
//!              │
//!              ├─ TokenGate          wait for a token (poll, bounded)
//!              ├─ HttpClient         one attempt, shared cookie jar
//!              └─ on 401:
//!                   RefreshCoordinator::join
//!                     ├─ Leader   ─► POST /refresh ─► store token ─► release queue
//!                     └─ Follower ─► wait on oneshot ─────────────► replay
//! ```
//!
//! A refresh failure terminates the session through the
//! [`SessionTerminator`](voicedash_common::SessionTerminator) and fails every
//! queued caller with the same error.

pub mod auth;
pub mod client;
pub mod errors;
pub mod refresh;
pub mod request;
pub mod token_gate;

pub use auth::AuthService;
pub use client::{AuthenticatedHttpClient, AuthenticatedHttpClientBuilder};
pub use errors::{ApiError, ApiErrorCategory};
pub use refresh::{RefreshCoordinator, RefreshLease, RefreshRole, RefreshWaiter};
pub use request::{ApiRequest, ApiResponse};
pub use token_gate::TokenGate;
