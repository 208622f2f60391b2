//! Backoff policy for retrying transient answer submission failures.

use std::time::Duration;

use survey_common::AnswerConfig;

/// Retry policy with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&AnswerConfig::default())
    }
}

impl From<&AnswerConfig> for RetryPolicy {
    fn from(config: &AnswerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: config.initial_backoff(),
            max_delay: config.max_backoff(),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Calculate delay for the given retry number (0-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt >= self.max_retries {
            return self.max_delay;
        }

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !delay_secs.is_finite() || delay_secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(delay_secs)
    }

    /// Check if another retry is allowed after `attempt` retries.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
        };

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(40));
    }

    #[test]
    fn test_max_delay() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
            multiplier: 2.0,
        };

        assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(250));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(250));
    }

    #[test]
    fn test_large_attempt_is_capped() {
        let policy = RetryPolicy {
            max_retries: u32::MAX,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(200),
            multiplier: 2.0,
        };

        assert_eq!(policy.delay_for_attempt(5_000), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(u32::MAX - 1), Duration::from_millis(200));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy {
            max_retries: 2,
            ..Default::default()
        };

        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }

    #[test]
    fn test_from_config() {
        let config = AnswerConfig {
            max_retries: 7,
            initial_backoff_ms: 5,
            max_backoff_ms: 50,
        };
        let policy = RetryPolicy::from(&config);

        assert_eq!(policy.max_retries, 7);
        assert_eq!(policy.initial_delay, Duration::from_millis(5));
        assert_eq!(policy.max_delay, Duration::from_millis(50));
    }
}
