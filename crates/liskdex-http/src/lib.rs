//! liskdex-http — resilient HTTP client for the Lisk indexing service.
//!
//! # Features
//! - Ordered fallback-host failover with sticky active-host promotion
//! - Retryable vs non-retryable failure classification (>= 500 and
//!   connection-level errors fail over; < 500 surfaces immediately)
//! - Original preferred-host error propagation when every fallback fails
//! - Injectable transport seam for tests

pub mod client;
pub mod transport;

pub use client::HttpClient;
pub use transport::{HttpTransport, ReqwestTransport};
