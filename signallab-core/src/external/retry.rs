//! Bounded retry with linear backoff.

use std::time::Duration;
use tracing::warn;

/// Sleeping abstraction so retry behavior is testable with a fake clock.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// A bounded retry policy: at most `max_attempts` tries, sleeping
/// `backoff(attempt)` between consecutive failures.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: fn(u32) -> Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: fn(u32) -> Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Linear backoff: sleep `attempt` seconds after attempt number
    /// `attempt` fails.
    pub fn linear(max_attempts: u32) -> Self {
        Self::new(max_attempts, |attempt| Duration::from_secs(attempt as u64))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or attempts are exhausted, returning
    /// the last error. Attempt numbers passed to `op` start at 1.
    pub fn run<T, E: std::fmt::Display>(
        &self,
        sleeper: &dyn Sleeper,
        mut op: impl FnMut(u32) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    let delay = (self.backoff)(attempt);
                    warn!(attempt, delay_secs = delay.as_secs(), %err, "retrying after failure");
                    sleeper.sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeSleeper;
    use super::*;

    #[test]
    fn succeeds_without_sleeping() {
        let sleeper = FakeSleeper::default();
        let result: Result<i32, String> =
            RetryPolicy::linear(5).run(&sleeper, |_| Ok(42));
        assert_eq!(result, Ok(42));
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[test]
    fn linear_backoff_sleeps_attempt_seconds() {
        let sleeper = FakeSleeper::default();
        let result: Result<(), String> =
            RetryPolicy::linear(5).run(&sleeper, |_| Err("down".into()));
        assert!(result.is_err());
        let slept = sleeper.slept.lock().unwrap();
        // 5 attempts, 4 sleeps of 1..4 seconds.
        assert_eq!(
            *slept,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn stops_retrying_after_first_success() {
        let sleeper = FakeSleeper::default();
        let mut calls = 0;
        let result: Result<u32, String> = RetryPolicy::linear(5).run(&sleeper, |attempt| {
            calls += 1;
            if attempt < 3 {
                Err("flaky".into())
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(result, Ok(3));
        assert_eq!(calls, 3);
        assert_eq!(sleeper.slept.lock().unwrap().len(), 2);
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let sleeper = FakeSleeper::default();
        let mut calls = 0;
        let _: Result<(), String> = RetryPolicy::linear(0).run(&sleeper, |_| {
            calls += 1;
            Err("nope".into())
        });
        assert_eq!(calls, 1);
    }
}
