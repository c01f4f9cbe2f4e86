//! Circuit breaker policy wrapped around every repository and remote call.
//!
//! The default policy is pass-through. The stateful CLOSED / OPEN / HALF_OPEN
//! breaker only exists when configuration provides all of its thresholds.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use configs::{BreakerThresholds, CircuitBreakerConfig};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Circuit is open, failing fast
    HalfOpen, // Testing if the backend has recovered
}

/// Returned instead of running the operation while the circuit is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("circuit breaker is open")]
pub struct BreakerOpen;

/// Whether an error counts as a backend failure.
pub trait TripsBreaker {
    fn trips_breaker(&self) -> bool { true }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u64,
    success_count: u64,
    last_failure_time: Option<Instant>,
    thresholds: BreakerThresholds,
}

impl BreakerInner {
    fn new(thresholds: BreakerThresholds) -> Self {
        Self { state: CircuitState::Closed, failure_count: 0, success_count: 0, last_failure_time: None, thresholds }
    }

    fn can_execute(&mut self) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => match self.last_failure_time {
                Some(last) if last.elapsed() >= self.thresholds.recovery_timeout => {
                    info!("circuit breaker transitioning to half-open state");
                    self.state = CircuitState::HalfOpen;
                    self.success_count = 0;
                    true
                }
                _ => {
                    debug!("circuit breaker is open, rejecting call");
                    false
                }
            },
            CircuitState::HalfOpen => self.success_count < self.thresholds.half_open_max_calls,
        }
    }

    fn record_success(&mut self) {
        match self.state {
            CircuitState::Closed => self.failure_count = 0,
            CircuitState::HalfOpen => {
                self.success_count += 1;
                if self.success_count >= self.thresholds.half_open_max_calls {
                    info!("circuit breaker closing after successful recovery");
                    self.reset();
                }
            }
            CircuitState::Open => self.reset(),
        }
    }

    fn record_failure(&mut self) {
        self.failure_count += 1;
        match self.state {
            CircuitState::Closed => {
                if self.failure_count >= self.thresholds.failure_threshold {
                    warn!(failures = self.failure_count, "circuit breaker opening");
                    self.state = CircuitState::Open;
                    self.last_failure_time = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                warn!("circuit breaker opening again after failure in half-open state");
                self.state = CircuitState::Open;
                self.success_count = 0;
                self.last_failure_time = Some(Instant::now());
            }
            CircuitState::Open => self.last_failure_time = Some(Instant::now()),
        }
    }

    fn reset(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.success_count = 0;
        self.last_failure_time = None;
    }
}

/// Cloneable handle; clones share one breaker state.
#[derive(Clone, Debug, Default)]
pub struct CircuitBreaker {
    inner: Option<Arc<Mutex<BreakerInner>>>,
}

impl CircuitBreaker {
    /// Policy that simply awaits the operation.
    pub fn pass_through() -> Self { Self { inner: None } }

    pub fn stateful(thresholds: BreakerThresholds) -> Self {
        Self { inner: Some(Arc::new(Mutex::new(BreakerInner::new(thresholds)))) }
    }

    pub fn from_config(cfg: &CircuitBreakerConfig) -> anyhow::Result<Self> {
        Ok(match cfg.thresholds()? {
            Some(t) => Self::stateful(t),
            None => Self::pass_through(),
        })
    }

    pub fn is_stateful(&self) -> bool { self.inner.is_some() }

    pub async fn state(&self) -> CircuitState {
        match &self.inner {
            Some(inner) => inner.lock().await.state,
            None => CircuitState::Closed,
        }
    }

    /// Run `op` under the policy. An open circuit yields `E::from(BreakerOpen)`
    /// without polling `op`.
    pub async fn call<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<BreakerOpen> + TripsBreaker,
    {
        let Some(inner) = &self.inner else {
            return op.await;
        };

        if !inner.lock().await.can_execute() {
            return Err(E::from(BreakerOpen));
        }

        let result = op.await;
        let mut guard = inner.lock().await;
        match &result {
            Err(e) if e.trips_breaker() => guard.record_failure(),
            _ => guard.record_success(),
        }
        result
    }
}
