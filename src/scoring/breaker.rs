// Circuit breaker for the primary scoring provider.
//
// After `threshold` consecutive failures the breaker opens and the gate goes
// straight to the heuristic for `cooldown`, instead of burning the provider
// timeout on every request while the provider is down. One success closes it.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Clone)]
pub struct CircuitBreaker {
    inner: Arc<Mutex<BreakerState>>,
    threshold: u32,
    cooldown: Duration,
}

struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BreakerState {
                consecutive_failures: 0,
                open_until: None,
            })),
            threshold,
            cooldown,
        }
    }

    /// True while the breaker is open. An elapsed cooldown half-opens it:
    /// the next call is allowed through as the probe.
    pub async fn is_open(&self) -> bool {
        let mut state = self.inner.lock().await;
        match state.open_until {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                state.open_until = None;
                false
            }
            None => false,
        }
    }

    pub async fn record_success(&self) {
        let mut state = self.inner.lock().await;
        state.consecutive_failures = 0;
        state.open_until = None;
    }

    pub async fn record_failure(&self) {
        let mut state = self.inner.lock().await;
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.threshold {
            state.open_until = Some(Instant::now() + self.cooldown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_closed() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        assert!(!breaker.is_open().await);
    }

    #[tokio::test]
    async fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert!(!breaker.is_open().await);
        breaker.record_failure().await;
        assert!(breaker.is_open().await);
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new(2, Duration::from_secs(30));
        breaker.record_failure().await;
        breaker.record_success().await;
        breaker.record_failure().await;
        assert!(!breaker.is_open().await);
    }

    #[tokio::test]
    async fn half_opens_after_cooldown() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(20));
        breaker.record_failure().await;
        assert!(breaker.is_open().await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!breaker.is_open().await);
    }
}
