//! Throttling retries at the transport layer.
//!
//! The lifecycle client itself never retries. Wrapping a transport in
//! [`RetryingControlPlane`] retries only `Throttling` failures, with
//! exponential backoff; everything else is returned on the first attempt.

use crate::clock::{Clock, SystemClock};
use sagekit_abstraction::{ControlPlane, ControlPlaneResult, Payload};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Retry policy for throttled requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier (e.g., 2.0 for exponential backoff).
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration, multiplier: f64) -> Self {
        Self { max_retries, initial_delay, max_delay, multiplier }
    }

    /// Policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// Calculate the delay for a given retry attempt.
    ///
    /// Uses exponential backoff: initial_delay * multiplier^retry_count, capped at max_delay.
    pub fn calculate_delay(&self, retry_count: u32) -> Duration {
        let delay_ms = (self.initial_delay.as_millis() as f64
            * self.multiplier.powi(retry_count as i32))
        .min(self.max_delay.as_millis() as f64) as u64;
        Duration::from_millis(delay_ms)
    }
}

/// Transport decorator that retries throttled calls.
pub struct RetryingControlPlane<T> {
    inner: T,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl<T: ControlPlane> RetryingControlPlane<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy, clock: Arc::new(SystemClock) }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: ControlPlane> ControlPlane for RetryingControlPlane<T> {
    fn execute(&self, operation: &str, payload: Payload) -> ControlPlaneResult<Payload> {
        let mut retry_count = 0;
        loop {
            match self.inner.execute(operation, payload.clone()) {
                Err(err) if err.is_retryable() && retry_count < self.policy.max_retries => {
                    let delay = self.policy.calculate_delay(retry_count);
                    warn!(
                        operation = %operation,
                        attempt = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Throttled by control plane, retrying"
                    );
                    self.clock.sleep(delay);
                    retry_count += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use sagekit_abstraction::ControlPlaneError;
    use std::sync::Mutex;

    /// Fails with the queued errors, then succeeds.
    struct Flaky {
        errors: Mutex<Vec<ControlPlaneError>>,
        calls: Mutex<usize>,
    }

    impl Flaky {
        fn new(mut errors: Vec<ControlPlaneError>) -> Self {
            errors.reverse();
            Self { errors: Mutex::new(errors), calls: Mutex::new(0) }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl ControlPlane for Flaky {
        fn execute(&self, _operation: &str, payload: Payload) -> ControlPlaneResult<Payload> {
            *self.calls.lock().unwrap() += 1;
            match self.errors.lock().unwrap().pop() {
                Some(err) => Err(err),
                None => Ok(payload),
            }
        }
    }

    fn throttled() -> ControlPlaneError {
        ControlPlaneError::Throttling("Rate exceeded".to_string())
    }

    #[test]
    fn test_calculate_delay_is_exponential_and_capped() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350), 2.0);
        assert_eq!(policy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(350));
    }

    #[test]
    fn test_retries_throttling_then_succeeds() {
        let clock = Arc::new(ManualClock::new());
        let transport = RetryingControlPlane::new(Flaky::new(vec![throttled(), throttled()]), RetryPolicy::default())
            .with_clock(clock.clone());

        assert!(transport.execute("ListTrainingJobs", Payload::new()).is_ok());
        assert_eq!(transport.inner().calls(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(200), Duration::from_millis(400)]);
    }

    #[test]
    fn test_gives_up_after_budget() {
        let clock = Arc::new(ManualClock::new());
        let policy = RetryPolicy { max_retries: 2, ..RetryPolicy::default() };
        let transport =
            RetryingControlPlane::new(Flaky::new(vec![throttled(); 5]), policy).with_clock(clock);

        let err = transport.execute("DescribeTrainingJob", Payload::new()).unwrap_err();
        assert!(matches!(err, ControlPlaneError::Throttling(_)));
        assert_eq!(transport.inner().calls(), 3);
    }

    #[test]
    fn test_non_retryable_errors_pass_through() {
        let clock = Arc::new(ManualClock::new());
        let transport = RetryingControlPlane::new(
            Flaky::new(vec![ControlPlaneError::Transport("connection reset".to_string())]),
            RetryPolicy::default(),
        )
        .with_clock(clock.clone());

        let err = transport.execute("CreateTrainingJob", Payload::new()).unwrap_err();
        assert!(matches!(err, ControlPlaneError::Transport(_)));
        assert_eq!(transport.inner().calls(), 1);
        assert!(clock.sleeps().is_empty());
    }
}
