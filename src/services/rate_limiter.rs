// src/services/rate_limiter.rs

//! Global request throttle shared by all crawl workers.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Caps the aggregate request rate across every caller of [`RateLimiter::wait`].
///
/// The previous call's completion time lives behind one async lock, and a
/// caller holds it while it sleeps, so the check and the timestamp update
/// can never interleave with another worker.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Option<Duration>,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Limit callers to `requests_per_second` calls in aggregate.
    ///
    /// Non-positive or non-finite rates disable limiting. A rate so small that
    /// its interval overflows a `Duration` waits `Duration::MAX`.
    /// Configuration validation rejects both cases before a crawl starts.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = (requests_per_second.is_finite() && requests_per_second > 0.0).then(|| {
            Duration::try_from_secs_f64(requests_per_second.recip()).unwrap_or(Duration::MAX)
        });

        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self {
            interval: None,
            last_call: Mutex::new(None),
        }
    }

    /// Whether `requests_per_second` is a usable limit: positive, finite and
    /// with an interval a `Duration` can hold.
    pub fn accepts(requests_per_second: f64) -> bool {
        requests_per_second.is_finite()
            && requests_per_second > 0.0
            && Duration::try_from_secs_f64(requests_per_second.recip()).is_ok()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Block until at least one interval has passed since the previous call returned.
    pub async fn wait(&self) {
        let Some(interval) = self.interval else {
            return;
        };

        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            tokio::time::sleep(interval.saturating_sub(previous.elapsed())).await;
        }
        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sequential_calls_are_spaced() {
        let limiter = RateLimiter::new(4.0);
        let interval = limiter.interval().unwrap();
        assert_eq!(interval, Duration::from_millis(250));

        let mut completed = Vec::new();
        for _ in 0..5 {
            limiter.wait().await;
            completed.push(Instant::now());
        }

        for pair in completed.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_call_does_not_wait() {
        let limiter = RateLimiter::new(1.0);
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_budget() {
        let limiter = Arc::new(RateLimiter::new(2.0));
        let completed = Arc::new(std::sync::Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let completed = Arc::clone(&completed);
                tokio::spawn(async move {
                    limiter.wait().await;
                    completed.lock().unwrap().push(Instant::now());
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut completed = completed.lock().unwrap().clone();
        completed.sort();
        assert_eq!(completed.len(), 6);
        for pair in completed.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unlimited_never_sleeps() {
        let limiter = RateLimiter::unlimited();
        let start = Instant::now();
        for _ in 0..10 {
            limiter.wait().await;
        }
        assert_eq!(Instant::now(), start);
        assert!(RateLimiter::new(0.0).interval().is_none());
    }

    #[test]
    fn accepts_only_representable_rates() {
        assert!(RateLimiter::accepts(2.0));
        assert!(RateLimiter::accepts(0.001));
        assert!(!RateLimiter::accepts(0.0));
        assert!(!RateLimiter::accepts(-1.0));
        assert!(!RateLimiter::accepts(f64::NAN));
        assert!(!RateLimiter::accepts(f64::INFINITY));
        assert!(!RateLimiter::accepts(1e-30));
    }

    #[tokio::test(start_paused = true)]
    async fn vanishing_rate_does_not_panic() {
        let limiter = RateLimiter::new(1e-30);
        assert_eq!(limiter.interval(), Some(Duration::MAX));

        limiter.wait().await;
        let second = tokio::time::timeout(Duration::from_secs(3600), limiter.wait()).await;
        assert!(second.is_err());
    }
}
