//! HTTP session shared across collection calls
//!
//! The session is a pre-configured client: timeout, user agent, default
//! headers and an optional client-side rate limiter. It deliberately does
//! NOT classify response statuses or retry. Failure handling belongs to
//! the collection engine, which needs to see every 429 and error itself.

mod client;
mod rate_limit;

pub use client::{redact_url, HttpSession, HttpSessionConfig, HttpSessionConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
