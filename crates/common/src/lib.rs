//! Shared session building blocks for VoiceDash crates.
//!
//! - [`auth`]: credential store and session termination boundaries
//! - [`testing`]: mock collaborators (enable the `test-utils` feature)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use auth::{
    BroadcastSessionTerminator, CredentialStore, SessionEvent, SessionStore, SessionTerminator,
};
