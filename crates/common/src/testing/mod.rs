//! Testing utilities and helpers
//!
//! - **[`mocks`]**: mock session collaborators
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use voicedash_common::testing::RecordingSessionTerminator;
//! use voicedash_common::SessionTerminator;
//!
//! let terminator = RecordingSessionTerminator::new();
//! terminator.terminate("/sign-in");
//! assert_eq!(terminator.calls(), 1);
//! # }
//! ```

pub mod mocks;

pub use mocks::{inject_token_after, RecordingSessionTerminator};
