use rand::Rng;
use tokio::time::Duration;

/// How long to wait before the next connection attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub jitter: Duration,
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Same interval forever, no jitter.
    pub const fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            jitter: Duration::ZERO,
            max_attempts: None,
        }
    }

    pub const fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Delay after `attempts` failed attempts, or `None` when out of attempts.
    pub fn next_delay(&self, attempts: u32) -> Option<Duration> {
        if let Some(max_attempts) = self.max_attempts {
            if attempts >= max_attempts {
                return None;
            }
        }

        if self.jitter.is_zero() {
            return Some(self.interval);
        }

        let jitter = rand::rng().random_range(0..=self.jitter.as_millis() as u64);
        Some(self.interval + Duration::from_millis(jitter))
    }
}
