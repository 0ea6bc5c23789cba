use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Spaces requests to a venue at least `min_gap` apart.
///
/// Callers never fail, they wait for the next free slot. Slots are handed out in the order
/// callers arrive.
#[derive(Debug)]
pub struct RateLimiter {
    min_gap: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait until this caller may issue its request.
    pub async fn acquire(&self) {
        let slot = {
            let mut next_slot = self.next_slot.lock();
            let now = Instant::now();
            let slot = next_slot.map_or(now, |next| next.max(now));
            *next_slot = Some(slot + self.min_gap);
            slot
        };

        if slot > Instant::now() {
            tracing::trace!(
                wait_ms = (slot - Instant::now()).as_millis() as u64,
                "rate limit saturated, waiting for next request slot"
            );
            tokio::time::sleep_until(slot).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        let start = Instant::now();

        let mut elapsed = Vec::new();
        for _ in 0..3 {
            limiter.acquire().await;
            elapsed.push((Instant::now() - start).as_millis());
        }

        assert_eq!(elapsed, vec![0, 100, 200]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_idle_gap_does_not_accumulate() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        limiter.acquire().await;

        tokio::time::sleep(Duration::from_millis(500)).await;

        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!((Instant::now() - before).as_millis(), 0);
    }
}
