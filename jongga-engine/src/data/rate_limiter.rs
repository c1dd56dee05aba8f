//! Call-budget throttle for the sentiment classifier.
//!
//! The classifier API allows a fixed number of calls per window. The throttle
//! counts calls and, once the budget is spent, parks the pipeline until the
//! window that started at the last reset has elapsed. It is a reset-after-N
//! counter rather than a sliding window: a burst right after a reset can still
//! exceed the steady-state rate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info};

use jongga_common::RateLimitConfig;

// ============================================================================
// Clock
// ============================================================================

/// Time source used by the throttle.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Call Throttle
// ============================================================================

/// Reset-after-N call throttle.
pub struct CallThrottle {
    /// Name for logging
    name: String,
    max_calls: u32,
    window: Duration,
    calls: u32,
    window_start: Instant,
    clock: Arc<dyn Clock>,
}

impl CallThrottle {
    /// Create a throttle whose first window starts now.
    pub fn new(
        name: impl Into<String>,
        max_calls: u32,
        window: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let window_start = clock.now();
        Self {
            name: name.into(),
            max_calls: max_calls.max(1),
            window,
            calls: 0,
            window_start,
            clock,
        }
    }

    /// Create a throttle from configuration.
    pub fn from_config(
        name: impl Into<String>,
        config: &RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            name,
            config.max_calls,
            Duration::from_secs(config.window_secs),
            clock,
        )
    }

    /// Calls counted since the last reset.
    pub fn calls_in_window(&self) -> u32 {
        self.calls
    }

    /// Record one call that has just been made.
    ///
    /// When this call spends the budget, waits out the rest of the window and
    /// starts a new one. Returns how long it waited, if at all.
    pub async fn record_call(&mut self) -> Option<Duration> {
        self.calls += 1;
        if self.calls < self.max_calls {
            return None;
        }

        let elapsed = self.clock.now().saturating_duration_since(self.window_start);
        let waited = if elapsed < self.window {
            let wait = self.window - elapsed;
            info!(
                throttle = %self.name,
                calls = self.calls,
                wait_ms = wait.as_millis() as u64,
                "Call budget spent, waiting for window"
            );
            self.clock.sleep(wait).await;
            Some(wait)
        } else {
            debug!(throttle = %self.name, calls = self.calls, "Window already elapsed");
            None
        };

        self.calls = 0;
        self.window_start = self.clock.now();
        waited
    }
}

impl std::fmt::Debug for CallThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallThrottle")
            .field("name", &self.name)
            .field("max_calls", &self.max_calls)
            .field("window", &self.window)
            .field("calls", &self.calls)
            .finish()
    }
}
