//! Error retriability and retry logic.

use std::future::Future;

use anyhow::{Error, Result};
use tokio_retry::RetryIf;

use crate::error_handling::get_retry_strategy;

/// Determines if an error is retriable (should be retried).
///
/// # Retriable Errors
///
/// - Network timeouts (`reqwest::Error::is_timeout()`)
/// - Connection failures (`reqwest::Error::is_connect()`)
/// - Server errors (5xx HTTP status codes)
/// - Rate limiting (429 Too Many Requests)
///
/// # Non-Retriable Errors
///
/// - Client errors (4xx HTTP status codes, except 429)
/// - Decode errors and malformed JSON payloads
/// - Other request failures (builder, body, redirect)
/// - Anything that is not an HTTP error (cache I/O, missing fields)
pub(crate) fn is_retriable_error(error: &Error) -> bool {
    for cause in error.chain() {
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            if let Some(status) = reqwest_err.status() {
                let status_code = status.as_u16();

                if status_code == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS {
                    return true;
                }
                if (400..500).contains(&status_code) {
                    return false;
                }
                if (500..600).contains(&status_code) {
                    return true;
                }
            }

            if reqwest_err.is_decode() || reqwest_err.is_redirect() {
                return false;
            }
            if reqwest_err.is_timeout() || reqwest_err.is_connect() {
                return true;
            }
            return false;
        }

        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return false;
        }
    }

    false
}

/// Runs `action` with exponential backoff, retrying only transient failures.
///
/// The first attempt runs immediately; retries follow `get_retry_strategy()`.
/// A non-retriable error is returned as soon as it occurs.
pub(crate) async fn retry_transient<T, F, Fut>(label: &str, mut action: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    RetryIf::start(
        get_retry_strategy(),
        || {
            attempt += 1;
            if attempt > 1 {
                log::debug!("Retrying {} (attempt {})", label, attempt);
            }
            action()
        },
        |e: &Error| is_retriable_error(e),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_plain_error_not_retriable() {
        let err = anyhow::anyhow!("Missing organism in dataset report");
        assert!(!is_retriable_error(&err));
    }

    #[test]
    fn test_json_error_not_retriable() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err).context("Failed to decode response");
        assert!(!is_retriable_error(&err));
    }

    #[test]
    fn test_builder_error_not_retriable() {
        let build_err = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert!(!build_err.is_timeout() && !build_err.is_connect());
        assert!(!is_retriable_error(&Error::from(build_err)));
    }

    #[tokio::test]
    async fn test_connect_error_retriable() {
        // Nothing listens on the discard port
        let connect_err = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .unwrap_err();
        assert!(connect_err.is_connect());
        let err = Error::from(connect_err).context("Failed to reach NCBI");
        assert!(is_retriable_error(&err));
    }

    #[tokio::test]
    async fn test_retry_transient_stops_on_permanent_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = retry_transient("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("permanent")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_transient_returns_success() {
        let value = retry_transient("test", || async { Ok::<_, Error>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }
}
