//! Retry and backoff policy.
//!
//! Maps libcurl failures onto the fetch error taxonomy and wraps a fetch
//! attempt with bounded exponential backoff, so the batch runner and the
//! transports share one consistent policy.

mod classify;
mod policy;
mod run;

pub use classify::{classify_curl_error, is_http_success};
pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry;
