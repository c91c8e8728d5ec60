//! Rate limiter initialization.
//!
//! This module provides a token-bucket rate limiter that paces NCBI requests.

use std::sync::Arc;

use tokio::sync::Semaphore as TokioSemaphore;
use tokio::time::{interval, Duration as TokioDuration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const MIN_REFILL_PERIOD: TokioDuration = TokioDuration::from_millis(1);
// Absorbs float error so `rps * (1 / rps)` counts as one whole token
const TOKEN_EPSILON: f64 = 1e-9;

/// Token-bucket rate limiter for controlling request rate.
///
/// Tokens are replenished at a fixed rate (requests per second, fractional
/// rates allowed) by a background task that ticks once per token interval.
/// Each request consumes one token and waits while the bucket is empty. The
/// bucket never holds more than its burst capacity.
pub struct RateLimiter {
    permits: Arc<TokioSemaphore>,
    rps: f64,
}

impl RateLimiter {
    /// Waits for a token and consumes it.
    pub async fn acquire(&self) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    /// The replenishment rate in requests per second.
    pub fn rps(&self) -> f64 {
        self.rps
    }

    #[cfg(test)]
    fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// Interval between refill ticks: one token interval, never shorter than 1ms.
fn refill_period(rps: f64) -> TokioDuration {
    TokioDuration::from_secs_f64(1.0 / rps).max(MIN_REFILL_PERIOD)
}

/// Initializes a token-bucket rate limiter.
///
/// If `rps` is not positive, rate limiting is disabled and `None` is returned.
/// The bucket starts full (`burst` tokens).
///
/// # Returns
///
/// A tuple of `(RateLimiter, CancellationToken)` if rate limiting is enabled.
/// Cancelling the token stops the background token replenishment task.
pub fn init_rate_limiter(rps: f64, burst: usize) -> Option<(Arc<RateLimiter>, CancellationToken)> {
    if rps <= 0.0 || !rps.is_finite() {
        return None;
    }
    let capacity = burst.max(1);
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    let limiter = Arc::new(RateLimiter {
        permits: Arc::new(TokioSemaphore::new(capacity)),
        rps,
    });

    let permits = limiter.permits.clone();
    let period = refill_period(rps);
    let per_tick = rps * period.as_secs_f64();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::spawn(async move {
        // The first tick completes immediately and earns nothing
        ticker.tick().await;
        let mut fractional_permits = 0.0f64;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let earned = per_tick + fractional_permits;
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let whole = (earned + TOKEN_EPSILON) as usize;
                    #[allow(clippy::cast_precision_loss)]
                    {
                        fractional_permits = (earned - whole as f64).max(0.0);
                    }

                    let room = capacity.saturating_sub(permits.available_permits());
                    let to_add = whole.min(room);
                    if to_add > 0 {
                        permits.add_permits(to_add);
                    }
                    if room == 0 {
                        // A full bucket does not bank partial tokens
                        fractional_permits = 0.0;
                    }
                }
                _ = shutdown_clone.cancelled() => {
                    log::debug!("Rate limiter background task shutting down");
                    break;
                }
            }
        }
    });

    Some((limiter, shutdown))
}
