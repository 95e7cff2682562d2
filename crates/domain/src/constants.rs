//! Application constants
//!
//! Centralized location for the defaults used by the API client and the
//! session layer.

// Token availability gate
pub const TOKEN_POLL_INTERVAL_MS: u64 = 100;
pub const TOKEN_WAIT_TIMEOUT_MS: u64 = 5000;

// Backend endpoints
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const REFRESH_PATH: &str = "/refresh";
pub const LOGIN_PATH: &str = "/login";

// HTTP
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

// Session termination
pub const SIGN_IN_REDIRECT: &str = "/sign-in";
pub const SESSION_EVENT_CAPACITY: usize = 16;
