//! Session state shared between the API client and the UI layer
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   reads/writes   ┌─────────────────┐
//! │  API client /    │ ───────────────► │ CredentialStore │ ◄── SessionStore
//! │  AuthService     │                  └─────────────────┘     (memory + file)
//! │                  │   terminate()    ┌───────────────────┐
//! │                  │ ───────────────► │ SessionTerminator │ ◄── BroadcastSessionTerminator
//! └──────────────────┘                  └───────────────────┘
//! ```
//!
//! The store is an explicit context object: every client is constructed with
//! the store it should use, so tests can run isolated sessions side by side.
//!
//! # Module Organization
//!
//! - **[`traits`]**: `CredentialStore` and `SessionTerminator` boundaries
//! - **[`session_store`]**: in-memory store with optional file persistence
//! - **[`terminator`]**: broadcast-based session terminator

pub mod session_store;
pub mod terminator;
pub mod traits;

pub use session_store::SessionStore;
pub use terminator::{BroadcastSessionTerminator, SessionEvent};
pub use traits::{CredentialStore, SessionTerminator};
