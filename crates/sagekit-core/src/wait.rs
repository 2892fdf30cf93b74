//! Client-side polling until a resource reaches a terminal status.

use crate::client::ResourceClient;
use crate::error::{LifecycleError, LifecycleResult};
use crate::resource::Resource;
use sagekit_resources::{LifecycleStatus, ResourceKind};
use std::time::Duration;
use tracing::{debug, info, warn};

const UNKNOWN_FAILURE_REASON: &str = "unknown failure reason";

/// Polling parameters for [`ResourceClient::wait`].
#[derive(Debug, Clone, PartialEq)]
pub struct WaitOptions {
    /// Delay before the second poll.
    pub poll_interval: Duration,
    /// Give up once this much time has elapsed without a terminal status.
    pub timeout: Option<Duration>,
    /// Factor applied to the delay after every poll; 1.0 keeps it fixed.
    pub backoff_multiplier: f64,
    /// Upper bound for the grown delay.
    pub max_poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout: None,
            backoff_multiplier: 1.0,
            max_poll_interval: Duration::from_secs(60),
        }
    }
}

impl WaitOptions {
    /// Fixed-delay polling.
    #[must_use]
    pub fn fixed(poll_interval: Duration) -> Self {
        Self { poll_interval, max_poll_interval: poll_interval, ..Self::default() }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, multiplier: f64, max_poll_interval: Duration) -> Self {
        self.backoff_multiplier = multiplier;
        self.max_poll_interval = max_poll_interval;
        self
    }

    /// Rejects settings that would busy-loop or shrink the delay.
    pub fn validate(&self) -> LifecycleResult<()> {
        if self.poll_interval.is_zero() {
            return Err(LifecycleError::Validation("poll interval must be greater than zero".to_string()));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(LifecycleError::Validation("backoff multiplier must be >= 1.0".to_string()));
        }
        if self.max_poll_interval < self.poll_interval {
            return Err(LifecycleError::Validation(
                "max poll interval must be >= poll interval".to_string(),
            ));
        }
        Ok(())
    }

    fn next_delay(&self, current: Duration) -> Duration {
        // Clamp in f64 so huge multipliers never reach Duration's range check.
        let secs = (current.as_secs_f64() * self.backoff_multiplier).min(self.max_poll_interval.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_poll_interval)
    }
}

/// How a successful wait ended.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitOutcome<S> {
    /// Terminal, non-failed status observed on the last poll.
    pub status: S,
    /// Number of refresh calls issued.
    pub polls: u32,
    pub elapsed: Duration,
}

impl<K: ResourceKind> ResourceClient<K> {
    /// Blocks until the resource reaches a terminal status.
    ///
    /// Each iteration refreshes `handle` and inspects its status; a delay
    /// elapses on the client's clock between polls. A terminal failed status
    /// returns `LifecycleError::ResourceFailed` carrying the failure reason
    /// from the final snapshot. If `options.timeout` passes first, returns
    /// `LifecycleError::Timeout`; the remote operation keeps running.
    pub fn wait(
        &self,
        handle: &mut Resource<K>,
        options: &WaitOptions,
    ) -> LifecycleResult<WaitOutcome<K::Status>> {
        options.validate()?;
        let type_name = K::schema().type_name;
        let start = self.clock.now();
        let mut delay = options.poll_interval;
        let mut polls = 0u32;

        loop {
            self.refresh(handle)?;
            polls += 1;
            let elapsed = self.clock.now().saturating_duration_since(start);

            match handle.status() {
                Some(status) if status.is_failed() => {
                    let reason = handle
                        .failure_reason()
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or(UNKNOWN_FAILURE_REASON)
                        .to_string();
                    warn!(
                        resource = type_name,
                        name = %handle.name(),
                        status = %status,
                        reason = %reason,
                        polls,
                        "Resource reached a failed terminal status"
                    );
                    return Err(LifecycleError::ResourceFailed {
                        name: handle.name().to_string(),
                        status: status.to_string(),
                        reason,
                    });
                }
                Some(status) if status.is_terminal() => {
                    info!(
                        resource = type_name,
                        name = %handle.name(),
                        status = %status,
                        polls,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Resource reached a terminal status"
                    );
                    return Ok(WaitOutcome { status: status.clone(), polls, elapsed });
                }
                status => {
                    debug!(
                        resource = type_name,
                        name = %handle.name(),
                        status = ?status.map(ToString::to_string),
                        detail = ?K::progress_detail(handle.snapshot()),
                        elapsed = ?elapsed,
                        "Still waiting, sleeping {:?}",
                        delay
                    );
                }
            }

            let sleep_for = match options.timeout {
                Some(timeout) if elapsed >= timeout => {
                    return Err(LifecycleError::Timeout { name: handle.name().to_string(), elapsed });
                }
                // Poll one last time at the deadline rather than overshooting it.
                Some(timeout) => delay.min(timeout - elapsed),
                None => delay,
            };
            self.clock.sleep(sleep_for);
            delay = options.next_delay(delay);
        }
    }

    /// [`wait`](Self::wait) with the client's default options.
    pub fn wait_default(&self, handle: &mut Resource<K>) -> LifecycleResult<WaitOutcome<K::Status>> {
        let options = self.wait_defaults().clone();
        self.wait(handle, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid_and_fixed() {
        let options = WaitOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.next_delay(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let options = WaitOptions::fixed(Duration::ZERO);
        assert!(matches!(options.validate(), Err(LifecycleError::Validation(_))));
    }

    #[test]
    fn test_backoff_grows_to_cap() {
        let options = WaitOptions::fixed(Duration::from_secs(1)).with_backoff(2.0, Duration::from_secs(3));
        let d1 = options.next_delay(Duration::from_secs(1));
        let d2 = options.next_delay(d1);
        assert_eq!(d1, Duration::from_secs(2));
        assert_eq!(d2, Duration::from_secs(3));
    }

    #[test]
    fn test_huge_multiplier_clamps_to_cap() {
        let options = WaitOptions::fixed(Duration::from_secs(1)).with_backoff(1e300, Duration::from_secs(60));
        assert!(options.validate().is_ok());
        assert_eq!(options.next_delay(Duration::from_secs(1)), Duration::from_secs(60));
        assert_eq!(options.next_delay(Duration::from_secs(60)), Duration::from_secs(60));
    }

    #[test]
    fn test_shrinking_multiplier_rejected() {
        let options = WaitOptions::default().with_backoff(0.5, Duration::from_secs(60));
        assert!(options.validate().is_err());
    }
}
