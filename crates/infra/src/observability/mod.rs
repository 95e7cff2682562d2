//! Observability infrastructure
//!
//! Structured logging through `tracing`. Call [`init_logging`] once at
//! startup; library code only emits events.

pub mod logging;

pub use logging::{build_filter, init_logging};
