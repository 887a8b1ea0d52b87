use tokio::time::{interval, Duration};

use crate::limiter::rate_limiter::FixedWindowLimiterStore;

pub async fn start_limiter_sweep(limiters: Vec<(&'static str, FixedWindowLimiterStore)>, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        for (name, limiter) in &limiters {
            let evicted = limiter.evict_expired();
            if evicted > 0 {
                tracing::debug!(limiter = *name, evicted, remaining = limiter.tracked_keys(), "Evicted expired rate limit windows");
            }
        }
    }
}
