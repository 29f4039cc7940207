//! Bounded retry policy for discovery attempts.
//!
//! A discovery attempt that accumulates zero records is retried after a
//! delay until the attempt budget runs out. The defaults reproduce the
//! fixed schedule of 15 attempts spaced 1000 ms apart.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default attempt budget for one harvest.
pub const DEFAULT_MAX_ATTEMPTS: usize = 15;

/// Default delay between empty attempts, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Backoff strategy for retry delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// delay = base (constant)
    #[default]
    Constant,
    /// delay = base * (attempt + 1)
    Linear,
    /// delay = base * 2^attempt
    Exponential,
}

/// Jitter applied on top of the backoff delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterStrategy {
    /// No jitter
    #[default]
    None,
    /// Random from 0 to delay
    Full,
    /// Half fixed, half random
    Equal,
}

/// Retry policy for discovery attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum discovery attempts (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Base delay between attempts in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Backoff strategy.
    #[serde(default)]
    pub backoff: BackoffStrategy,
    /// Jitter strategy.
    #[serde(default)]
    pub jitter: JitterStrategy,
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff: BackoffStrategy::Constant,
            jitter: JitterStrategy::None,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay_ms(mut self, delay: u64) -> Self {
        self.base_delay_ms = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay_ms(mut self, delay: u64) -> Self {
        self.max_delay_ms = delay;
        self
    }

    /// Sets the backoff strategy.
    #[must_use]
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Sets the jitter strategy.
    #[must_use]
    pub fn with_jitter(mut self, strategy: JitterStrategy) -> Self {
        self.jitter = strategy;
        self
    }

    /// Computes the delay to wait after the given (0-indexed) failed attempt.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let base = self.base_delay_ms;
        let max = self.max_delay_ms;

        let delay = match self.backoff {
            BackoffStrategy::Constant => base.min(max),
            BackoffStrategy::Linear => base.saturating_mul(attempt as u64 + 1).min(max),
            BackoffStrategy::Exponential => {
                let factor = 2u64.saturating_pow(u32::try_from(attempt).unwrap_or(u32::MAX));
                base.saturating_mul(factor).min(max)
            }
        };

        let jittered = match self.jitter {
            JitterStrategy::None => delay,
            JitterStrategy::Full => {
                if delay == 0 {
                    0
                } else {
                    rand::thread_rng().gen_range(0..=delay)
                }
            }
            JitterStrategy::Equal => {
                let half = delay / 2;
                if half == 0 {
                    delay
                } else {
                    half + rand::thread_rng().gen_range(0..=half)
                }
            }
        };

        Duration::from_millis(jittered)
    }
}

/// Outcome of a retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Start another attempt after the delay.
    Retry,
    /// The attempt budget is spent.
    GiveUp,
}

/// Attempt bookkeeping for one harvest.
#[derive(Debug, Default)]
pub struct RetryState {
    /// Number of attempts that came back empty so far.
    pub attempt: usize,
}

impl RetryState {
    /// Creates a new retry state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an empty attempt and decides what happens next.
    ///
    /// The delay is reported even on the final attempt, so callers that
    /// always sleep before checking keep the fixed schedule.
    pub fn record_empty(&mut self, policy: &RetryPolicy) -> (Duration, RetryDecision) {
        let delay = policy.delay_for_attempt(self.attempt);
        self.attempt += 1;
        let decision = if self.is_exhausted(policy) {
            RetryDecision::GiveUp
        } else {
            RetryDecision::Retry
        };
        (delay, decision)
    }

    /// Returns true if the attempt budget is spent.
    #[must_use]
    pub fn is_exhausted(&self, policy: &RetryPolicy) -> bool {
        self.attempt >= policy.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 15);
        assert_eq!(policy.base_delay_ms, 1000);
        assert_eq!(policy.backoff, BackoffStrategy::Constant);
        assert_eq!(policy.jitter, JitterStrategy::None);
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicy::new()
            .with_max_attempts(5)
            .with_base_delay_ms(500)
            .with_max_delay_ms(10_000)
            .with_backoff(BackoffStrategy::Linear)
            .with_jitter(JitterStrategy::Full);

        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay_ms, 500);
        assert_eq!(policy.max_delay_ms, 10_000);
        assert_eq!(policy.backoff, BackoffStrategy::Linear);
        assert_eq!(policy.jitter, JitterStrategy::Full);
    }

    #[test]
    fn test_constant_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(14), Duration::from_millis(1000));
    }

    #[test]
    fn test_linear_and_exponential_delay() {
        let linear = RetryPolicy::new()
            .with_base_delay_ms(100)
            .with_backoff(BackoffStrategy::Linear);
        assert_eq!(linear.delay_for_attempt(2), Duration::from_millis(300));

        let exponential = RetryPolicy::new()
            .with_base_delay_ms(100)
            .with_backoff(BackoffStrategy::Exponential);
        assert_eq!(exponential.delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy::new()
            .with_base_delay_ms(1000)
            .with_max_delay_ms(5000)
            .with_backoff(BackoffStrategy::Exponential);

        assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(5000));
        assert_eq!(policy.delay_for_attempt(200), Duration::from_millis(5000));
    }

    #[test]
    fn test_full_jitter_bounded() {
        let policy = RetryPolicy::new()
            .with_base_delay_ms(100)
            .with_jitter(JitterStrategy::Full);

        for _ in 0..10 {
            assert!(policy.delay_for_attempt(0) <= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_record_empty_gives_up_after_budget() {
        let policy = RetryPolicy::new().with_max_attempts(3).with_base_delay_ms(0);
        let mut state = RetryState::new();

        assert!(matches!(state.record_empty(&policy).1, RetryDecision::Retry));
        assert!(matches!(state.record_empty(&policy).1, RetryDecision::Retry));
        assert_eq!(state.record_empty(&policy).1, RetryDecision::GiveUp);
        assert_eq!(state.attempt, 3);
        assert!(state.is_exhausted(&policy));
    }

    #[test]
    fn test_record_empty_reports_delay_on_final_attempt() {
        let policy = RetryPolicy::new().with_max_attempts(1).with_base_delay_ms(250);
        let mut state = RetryState::new();

        assert_eq!(
            state.record_empty(&policy),
            (Duration::from_millis(250), RetryDecision::GiveUp)
        );
    }

    #[test]
    fn test_retry_policy_serde_defaults() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"max_attempts": 4}"#).unwrap();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.base_delay_ms, 1000);

        let policy: RetryPolicy =
            serde_json::from_str(r#"{"backoff": "exponential", "jitter": "equal"}"#).unwrap();
        assert_eq!(policy.backoff, BackoffStrategy::Exponential);
        assert_eq!(policy.jitter, JitterStrategy::Equal);
    }
}
