//! Supervisor retry strategy for failed sessions.
//!
//! Sessions never retry themselves. A supervising view that still wants a
//! camera visible consults its policy after observing a terminal state;
//! `None` reproduces the reference behavior of waiting for a manual reopen.

use crate::config::StreamSettings;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Never reopen automatically.
    None,
    /// Reopen after a constant delay, up to `max_attempts` times.
    FixedDelay { delay: Duration, max_attempts: u32 },
    /// Reopen after `base * 2^attempt`, capped at `max`, up to `max_attempts` times.
    Backoff {
        base: Duration,
        max: Duration,
        max_attempts: u32,
    },
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based), or `None` when the
    /// policy is exhausted or disabled.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match *self {
            RetryPolicy::None => None,
            RetryPolicy::FixedDelay { delay, max_attempts } => {
                (attempt < max_attempts).then_some(delay)
            }
            RetryPolicy::Backoff {
                base,
                max,
                max_attempts,
            } => {
                if attempt >= max_attempts {
                    return None;
                }
                let factor = 2u32.saturating_pow(attempt.min(16));
                Some(base.saturating_mul(factor).min(max))
            }
        }
    }

    /// Build from validated stream settings.
    pub fn from_settings(settings: &StreamSettings) -> Self {
        match settings.retry_policy.as_str() {
            "fixed" => RetryPolicy::FixedDelay {
                delay: Duration::from_millis(settings.retry_delay_ms),
                max_attempts: settings.retry_max_attempts,
            },
            "backoff" => RetryPolicy::Backoff {
                base: Duration::from_millis(settings.retry_delay_ms),
                max: Duration::from_millis(settings.retry_max_delay_ms),
                max_attempts: settings.retry_max_attempts,
            },
            _ => RetryPolicy::None,
        }
    }
}
