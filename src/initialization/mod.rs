//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources used by
//! NCBI lookups:
//! - Logger (plain or JSON)
//! - HTTP client (timeout and User-Agent)
//! - Token-bucket rate limiter
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod rate_limiter;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use rate_limiter::{init_rate_limiter, RateLimiter};
