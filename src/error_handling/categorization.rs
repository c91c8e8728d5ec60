//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize lookup errors and configure retry strategies.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::stats::LookupStats;
use super::types::ErrorType;

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR`
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_ATTEMPTS`
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if let Some(status) = error.status() {
        match status.as_u16() {
            400 => return ErrorType::HttpRequestBadRequest,
            404 => return ErrorType::HttpRequestNotFound,
            429 => return ErrorType::HttpRequestTooManyRequests,
            _ if status.is_server_error() => return ErrorType::HttpRequestServerError,
            _ if status.is_client_error() => return ErrorType::HttpRequestOtherError,
            _ => {}
        }
    }

    if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_decode() {
        ErrorType::ResponseDecodeError
    } else {
        ErrorType::HttpRequestOtherError
    }
}

/// Categorizes any lookup failure by walking its error chain.
///
/// `reqwest` errors are categorized by status and kind; JSON payload errors
/// count as decode errors; anything else is an "other" HTTP error.
pub fn categorize_lookup_error(error: &anyhow::Error) -> ErrorType {
    for cause in error.chain() {
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            return categorize_reqwest_error(reqwest_err);
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return ErrorType::ResponseDecodeError;
        }
    }
    ErrorType::HttpRequestOtherError
}

/// Records a failed lookup in `stats` under its categorized `ErrorType`.
pub fn update_error_stats(stats: &LookupStats, error: &anyhow::Error) {
    stats.increment_error(categorize_lookup_error(error));
}
