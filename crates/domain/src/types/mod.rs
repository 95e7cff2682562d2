//! Domain types and models

pub mod session;

pub use session::{Credentials, PersistedSession, UserProfile};
