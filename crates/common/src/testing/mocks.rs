//! Mock implementations of session collaborators
//!
//! Provides mock objects for testing purposes.

// Allow missing panic docs for test mocks - they are designed to be simple
#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::auth::{CredentialStore, SessionTerminator};

/// Session terminator that records every call
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-utils")]
/// # {
/// use voicedash_common::testing::mocks::RecordingSessionTerminator;
/// use voicedash_common::SessionTerminator;
///
/// let terminator = RecordingSessionTerminator::new();
/// terminator.terminate("/sign-in");
///
/// assert_eq!(terminator.redirects(), vec!["/sign-in".to_string()]);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSessionTerminator {
    redirects: Arc<Mutex<Vec<String>>>,
}

impl RecordingSessionTerminator {
    /// Create a terminator with no recorded calls
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `terminate` was called
    pub fn calls(&self) -> usize {
        // SAFETY: Mutex poisoning is acceptable in test mocks - if a test panics,
        // the entire test fails anyway
        self.redirects.lock().unwrap().len()
    }

    /// Redirect targets in call order
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl SessionTerminator for RecordingSessionTerminator {
    fn terminate(&self, redirect_to: &str) {
        self.redirects.lock().unwrap().push(redirect_to.to_string());
    }
}

/// Write `token` into `store` after `delay`, simulating late hydration
pub fn inject_token_after<S>(store: Arc<S>, token: &str, delay: Duration) -> JoinHandle<()>
where
    S: CredentialStore + ?Sized + 'static,
{
    let token = token.to_string();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        store.set_token(token, true).await;
    })
}
