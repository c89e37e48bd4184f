//! Retry policy consulted by the upstream client between attempts.

use std::time::Duration;

use async_trait::async_trait;

/// Backoff curve applied to a transient failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base × 2^attempt`: service unavailable, timeouts, connection errors.
    Exponential,
    /// `base × 3^attempt`: rate limits back off harder.
    RateLimit,
}

impl Backoff {
    fn multiplier(self) -> u32 {
        match self {
            Backoff::Exponential => 2,
            Backoff::RateLimit => 3,
        }
    }
}

/// How many times to call the upstream and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay unit scaled by the backoff curve.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay before retrying after zero-based `attempt` failed.
    pub fn delay_for(&self, backoff: Backoff, attempt: u32) -> Duration {
        let factor = backoff.multiplier().saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether zero-based `attempt` is the last one the policy allows.
    pub fn is_last(&self, attempt: u32) -> bool {
        attempt + 1 >= self.max_attempts
    }
}

/// Waits out a backoff delay.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exponential_doubles_from_base() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..3).map(|a| policy.delay_for(Backoff::Exponential, a)).collect();
        assert_eq!(
            delays,
            vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[test]
    fn rate_limit_triples_from_base() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(policy.delay_for(Backoff::RateLimit, 0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(Backoff::RateLimit, 1), Duration::from_millis(1500));
        assert_eq!(policy.delay_for(Backoff::RateLimit, 2), Duration::from_millis(4500));
    }

    #[test]
    fn huge_attempts_saturate_instead_of_overflowing() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(Backoff::RateLimit, 200), Duration::from_secs(u32::MAX as u64));
    }

    #[test]
    fn last_attempt_is_max_minus_one() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_last(0));
        assert!(!policy.is_last(1));
        assert!(policy.is_last(2));
    }

    #[tokio::test]
    async fn tokio_sleeper_waits_on_the_timer() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
