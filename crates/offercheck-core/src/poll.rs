//! Bounded readiness polling.
//!
//! UI elements on the booking site animate in and out, so a plain "click now"
//! is flaky. [`Poller`] repeatedly asks a [`PollTarget`] whether it can be
//! interacted with, acts on it exactly once when it can, and gives up after a
//! fixed wall-clock budget. Time is read through a [`Clock`] so tests can run
//! the loop without real delays.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default waiting budget for a single poll (5 seconds)
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default delay between readiness checks (100ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something the poller can check for readiness and then act on.
///
/// Errors from [`is_ready`](PollTarget::is_ready) are treated as "not ready".
/// Errors from [`act`](PollTarget::act) are handed back to the caller untouched.
#[async_trait]
pub trait PollTarget: Send + Sync {
    type Error: Display + Send;

    /// Non-blocking readiness query
    async fn is_ready(&self) -> std::result::Result<bool, Self::Error>;

    /// The single mutating operation, e.g. a click
    async fn act(&self) -> std::result::Result<(), Self::Error>;
}

/// Time source and sleep primitive used by the poll loop
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio's timer.
///
/// `now()` goes through `tokio::time::Instant` so a paused tokio runtime
/// also pauses this clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// Timeout budget and poll interval for one poll.
///
/// A zero timeout means "check exactly once".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    timeout: Duration,
    interval: Duration,
}

impl PollConfig {
    /// Create a poll configuration.
    ///
    /// The interval must be non-zero, and the timeout must be either zero or
    /// at least one interval long.
    pub fn new(timeout: Duration, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::InvalidArgument(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        if !timeout.is_zero() && timeout < interval {
            return Err(Error::InvalidArgument(format!(
                "poll timeout ({}ms) must not be shorter than the interval ({}ms)",
                timeout.as_millis(),
                interval.as_millis()
            )));
        }

        Ok(Self { timeout, interval })
    }

    pub fn from_millis(timeout_ms: u64, interval_ms: u64) -> Result<Self> {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    /// One readiness check, no waiting
    pub fn single_check() -> Self {
        Self {
            timeout: Duration::ZERO,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Terminal result of [`Poller::poll_and_act`]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    /// The target became ready and `act()` completed
    Acted,
    /// The budget ran out before the target became ready; nothing was done
    TimedOut,
}

/// Bounded-retry poll loop parametrised by a [`Clock`]
#[derive(Debug, Clone, Default)]
pub struct Poller<C = SystemClock> {
    clock: C,
}

impl Poller<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> Poller<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Wait for `target` to report ready, then act on it once.
    ///
    /// Returns `TimedOut` if the budget elapses first. An error from `act()`
    /// is returned as-is; it is never retried.
    pub async fn poll_and_act<T>(
        &self,
        target: &T,
        config: PollConfig,
    ) -> std::result::Result<PollOutcome, T::Error>
    where
        T: PollTarget + ?Sized,
    {
        let ready = self
            .wait_until(
                || async move { target.is_ready().await.map(|ready| ready.then_some(())) },
                config,
            )
            .await;

        match ready {
            Some(()) => {
                target.act().await?;
                Ok(PollOutcome::Acted)
            }
            None => Ok(PollOutcome::TimedOut),
        }
    }

    /// Run `probe` until it yields a value or the budget runs out.
    ///
    /// Probe errors count as "not yet". Sleeps are clamped to the remaining
    /// budget so the last check lands on the deadline. If a sleep overruns
    /// the deadline, one more check happens before giving up.
    pub async fn wait_until<F, Fut, V, E>(&self, mut probe: F, config: PollConfig) -> Option<V>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<Option<V>, E>>,
        E: Display,
    {
        let start = self.clock.now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            match probe().await {
                Ok(Some(value)) => {
                    tracing::debug!(
                        "Poll satisfied after {} check(s), {}ms",
                        attempts,
                        self.clock.now().saturating_duration_since(start).as_millis()
                    );
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => tracing::trace!("Readiness check failed, treating as not ready: {}", e),
            }

            let elapsed = self.clock.now().saturating_duration_since(start);
            if elapsed >= config.timeout() {
                tracing::debug!(
                    "Poll timed out after {} check(s), {}ms (budget {}ms)",
                    attempts,
                    elapsed.as_millis(),
                    config.timeout().as_millis()
                );
                return None;
            }

            let remaining = config.timeout() - elapsed;
            self.clock.sleep(config.interval().min(remaining)).await;
        }
    }
}
