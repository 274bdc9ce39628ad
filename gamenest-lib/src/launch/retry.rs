//! Bounded retry for in-progress syncs.
//!
//! The decision of whether to retry is pure so it can be tested without
//! sleeping; the coordinator owns the actual delay.

use std::time::Duration;

use super::outcome::SyncOutcome;

/// Retries allowed after the first attempt.
pub const MAX_RETRIES: u8 = 5;

/// Fixed delay between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Who is driving the launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    /// A user pressed "play"; in-progress syncs are reported at once.
    #[default]
    Interactive,
    /// An external launch request; in-progress syncs are retried.
    Automated,
}

/// What to do with the outcome of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    RetryAfter(Duration),
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u8,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Next step after an attempt that followed `retries_done` retries.
    pub fn next_step(&self, mode: LaunchMode, outcome: &SyncOutcome, retries_done: u8) -> RetryStep {
        match (mode, outcome) {
            (LaunchMode::Automated, SyncOutcome::InProgress) if retries_done < self.max_retries => {
                RetryStep::RetryAfter(self.delay)
            }
            _ => RetryStep::Surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactive_launches_never_retry() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.next_step(LaunchMode::Interactive, &SyncOutcome::InProgress, 0),
            RetryStep::Surface
        );
    }

    #[test]
    fn automated_launches_retry_in_progress_up_to_the_limit() {
        let policy = RetryPolicy::default();
        for done in 0..MAX_RETRIES {
            assert_eq!(
                policy.next_step(LaunchMode::Automated, &SyncOutcome::InProgress, done),
                RetryStep::RetryAfter(RETRY_DELAY)
            );
        }
        assert_eq!(
            policy.next_step(LaunchMode::Automated, &SyncOutcome::InProgress, MAX_RETRIES),
            RetryStep::Surface
        );
    }

    #[test]
    fn other_outcomes_are_surfaced_immediately() {
        let policy = RetryPolicy::default();
        for outcome in [
            SyncOutcome::Success,
            SyncOutcome::UnknownFail,
            SyncOutcome::Conflict {
                local_ts: 1,
                remote_ts: 2,
            },
        ] {
            assert_eq!(
                policy.next_step(LaunchMode::Automated, &outcome, 0),
                RetryStep::Surface
            );
        }
    }
}
