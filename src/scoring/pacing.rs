// Request pacing for the Perspective endpoint.
//
// The free tier allows one analyze call per second; going over returns 429s
// that would count as provider failures and trip the circuit breaker. Each
// caller reserves the next open slot and sleeps until it arrives, so
// concurrent scoring requests queue instead of erroring.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Clone)]
pub struct RequestPacer {
    interval: Duration,
    next_slot: Arc<Mutex<Instant>>,
}

impl RequestPacer {
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / requests_per_second),
            next_slot: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Reserve the next request slot, sleeping until it opens. Returns
    /// immediately when the caller is under the rate. The lock is held only
    /// long enough to claim the slot, never across the sleep.
    pub async fn until_ready(&self) {
        let wait = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = (*next).max(now);
            *next = slot + self.interval;
            slot.saturating_duration_since(now)
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_passes_immediately() {
        let pacer = RequestPacer::new(1.0);
        let start = Instant::now();
        pacer.until_ready().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn second_call_waits_for_the_next_slot() {
        // 4 per second, so the second call waits ~250ms
        let pacer = RequestPacer::new(4.0);
        pacer.until_ready().await;
        let start = Instant::now();
        pacer.until_ready().await;
        assert!(
            start.elapsed() >= Duration::from_millis(200),
            "expected ~250ms wait, got {:?}",
            start.elapsed()
        );
    }
}
