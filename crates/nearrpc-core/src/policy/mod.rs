//! Retry policy for the request pipeline.
//!
//! ```text
//! send_request → [transport] → [unwrap/classify] → retryable? → [BackoffPolicy] → sleep → again
//! ```

pub mod backoff;

pub use backoff::{BackoffConfig, BackoffPolicy};
