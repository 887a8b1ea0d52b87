use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

/// Fixed window counter for a single key
#[derive(Debug)]
pub struct FixedWindow {
    window_start: Instant,
    count: u64,
}

impl FixedWindow {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    fn is_expired(&self, window_size: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.window_start) >= window_size
    }

    /// Resets the window if it elapsed, then counts this hit.
    fn hit(&mut self, window_size: Duration, now: Instant) -> u64 {
        if self.is_expired(window_size, now) {
            self.window_start = now;
            self.count = 0;
        }
        self.count += 1;
        self.count
    }

    fn resets_in(&self, window_size: Duration, now: Instant) -> Duration {
        (self.window_start + window_size).saturating_duration_since(now)
    }
}

/// Outcome of a single limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub retry_after: Option<Duration>,
}

/// --- Rate limiter store & eviction ---
type Key = String;
#[derive(Clone)]
pub struct FixedWindowLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<FixedWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl FixedWindowLimiterStore {
    pub fn new(window_size: Duration, limit: u64) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<FixedWindow>> {
        // The shard read guard must be released before `entry` takes the write lock
        let existing = self.map.get(key).map(|entry| entry.value().clone());
        if let Some(window) = existing {
            return window;
        }

        match self.map.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let window = Arc::new(Mutex::new(FixedWindow::new(now)));
                entry.insert(window.clone());
                window
            }
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Counts one request for `key` at `now`. The per-key lock is held across
    /// reset, increment and compare.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let window = self.get_window(key, now);
        let mut w = window.lock();
        let count = w.hit(self.window_size, now);

        if count > self.limit {
            RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                retry_after: Some(w.resets_in(self.window_size, now)),
            }
        } else {
            RateDecision {
                allowed: true,
                limit: self.limit,
                remaining: self.limit - count,
                retry_after: None,
            }
        }
    }

    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    /// Drops windows that elapsed before `now`. Returns how many were removed.
    pub fn evict_expired_at(&self, now: Instant) -> usize {
        let before = self.map.len();
        let window_size = self.window_size;
        // Entries still referenced by an in-flight check are kept for the next sweep
        self.map.retain(|_, window| {
            if Arc::strong_count(window) > 1 {
                return true;
            }
            match window.try_lock() {
                Some(w) => !w.is_expired(window_size, now),
                None => true,
            }
        });
        before.saturating_sub(self.map.len())
    }
}
