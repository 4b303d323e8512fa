//! Bounded retries with uniform jitter

use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            jitter_min: Duration::from_millis(200),
            jitter_max: Duration::from_millis(600),
        }
    }
}

impl From<&nbs_config::ProbeConfig> for RetryPolicy {
    fn from(config: &nbs_config::ProbeConfig) -> Self {
        let (jitter_min, jitter_max) = config.jitter();
        Self {
            attempts: config.retries.max(1),
            jitter_min,
            jitter_max,
        }
    }
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub struct Retried<T, E> {
    pub result: Result<T, E>,
    /// Attempts actually made
    pub attempts: u32,
}

impl RetryPolicy {
    /// Random delay drawn uniformly from the jitter window
    #[must_use]
    pub fn delay(&self) -> Duration {
        let low = self.jitter_min.min(self.jitter_max);
        let high = self.jitter_min.max(self.jitter_max);
        if low == high {
            return low;
        }
        let millis = rand::rng().random_range(duration_millis(low)..=duration_millis(high));
        Duration::from_millis(millis)
    }

    /// Run `op` until it succeeds, `should_retry` rejects the error, or the
    /// attempt budget is spent. A jittered sleep precedes every retry.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, should_retry: P) -> Retried<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            let result = op(attempt).await;
            match result {
                Err(ref error) if attempt < attempts && should_retry(error) => {
                    tokio::time::sleep(self.delay()).await;
                    attempt += 1;
                }
                result => {
                    return Retried {
                        result,
                        attempts: attempt,
                    }
                }
            }
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
