use std::time::Duration;

use crate::error::ErrorKind;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up and report the error.
    NoRetry,
    /// Wait, then make another attempt.
    RetryAfter(Duration),
}

/// Per-entry retry budget with capped exponential backoff.
///
/// Only transport failures are retried: a remote rejection (404, FTP 550)
/// or a local I/O problem will not change on a second attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per entry, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each further failure.
    pub base_delay: Duration,
    /// Ceiling for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_attempts` total attempts and default delays.
    /// Zero is treated as one attempt.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Decide what follows failed attempt number `attempt` (1-based).
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if kind != ErrorKind::Transport || attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }

    /// `base * 2^(attempt-1)`, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(8);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_retry_for_remote_or_local() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Remote), RetryDecision::NoRetry);
        assert_eq!(p.decide(1, ErrorKind::LocalIo), RetryDecision::NoRetry);
        assert_eq!(p.decide(1, ErrorKind::Cancelled), RetryDecision::NoRetry);
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff(1), Duration::from_millis(500));
        assert_eq!(p.backoff(2), Duration::from_secs(1));
        assert_eq!(p.backoff(3), Duration::from_secs(2));
        assert_eq!(p.backoff(15), p.max_delay);

        let wide = RetryPolicy {
            max_attempts: 20,
            ..p
        };
        assert_eq!(
            wide.decide(4, ErrorKind::Transport),
            RetryDecision::RetryAfter(Duration::from_secs(4))
        );
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::with_attempts(3);
        assert!(matches!(
            p.decide(1, ErrorKind::Transport),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, ErrorKind::Transport),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Transport), RetryDecision::NoRetry);
    }

    #[test]
    fn zero_attempts_means_one() {
        let p = RetryPolicy::with_attempts(0);
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.decide(1, ErrorKind::Transport), RetryDecision::NoRetry);
    }
}
