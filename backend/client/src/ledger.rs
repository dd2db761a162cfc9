//! # Rate Limit Ledger
//!
//! Rolling record of recent submission timestamps.
//!
//! ## Implementation
//!
//! - One storage key, JSON array of epoch-millisecond numbers
//! - Entries older than the trailing window are pruned on every read
//! - Checking capacity and consuming a slot are one operation: an allowed
//!   check appends the current timestamp and persists, a denied check
//!   writes nothing
//! - An unreadable stored value counts as an empty ledger

use chrono::Utc;

use crate::storage::KeyValueStore;

pub const LEDGER_KEY: &str = "flag-submissions";

/// Max accepted submissions per trailing window.
pub const SUBMISSION_CAP: usize = 5;

/// Trailing window, one hour.
pub const SUBMISSION_WINDOW_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCheck {
    pub allowed: bool,
    pub remaining: usize,
}

pub struct RateLimiter<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> RateLimiter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Check capacity and, if available, consume a slot.
    pub fn check(&self) -> RateCheck {
        self.check_at(Utc::now().timestamp_millis())
    }

    pub fn check_at(&self, now_ms: i64) -> RateCheck {
        let mut ledger = self.read();
        ledger.retain(|&stamp| now_ms - stamp < SUBMISSION_WINDOW_MS);

        if ledger.len() >= SUBMISSION_CAP {
            return RateCheck {
                allowed: false,
                remaining: 0,
            };
        }

        ledger.push(now_ms);
        self.write(&ledger);

        RateCheck {
            allowed: true,
            remaining: SUBMISSION_CAP - ledger.len(),
        }
    }

    /// Explicit reset, the only way the ledger is ever deleted.
    pub fn reset(&self) {
        self.store.remove(LEDGER_KEY);
    }

    fn read(&self) -> Vec<i64> {
        self.store
            .get(LEDGER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn write(&self, ledger: &[i64]) {
        if let Ok(raw) = serde_json::to_string(ledger) {
            self.store.set(LEDGER_KEY, &raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn stored(store: &MemoryStore) -> Vec<i64> {
        store
            .get(LEDGER_KEY)
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }

    #[test]
    fn test_cap_within_window() {
        let store = MemoryStore::new();
        let limiter = RateLimiter::new(&store);

        for attempt in 0..SUBMISSION_CAP {
            let check = limiter.check_at(1_000 + attempt as i64);
            assert!(check.allowed);
            assert_eq!(check.remaining, SUBMISSION_CAP - attempt - 1);
        }

        let denied = limiter.check_at(2_000);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[test]
    fn test_denied_check_leaves_ledger_untouched() {
        let store = MemoryStore::new();
        let limiter = RateLimiter::new(&store);

        for attempt in 0..SUBMISSION_CAP {
            limiter.check_at(1_000 + attempt as i64);
        }
        let before = stored(&store);

        limiter.check_at(2_000);
        assert_eq!(stored(&store), before);
    }

    #[test]
    fn test_expiry_restores_exact_capacity() {
        let store = MemoryStore::new();
        let limiter = RateLimiter::new(&store);

        // Two early entries, three late ones.
        limiter.check_at(0);
        limiter.check_at(1);
        limiter.check_at(500_000);
        limiter.check_at(500_001);
        limiter.check_at(500_002);

        assert!(!limiter.check_at(500_003).allowed);

        // Past the window for the two earliest entries only.
        let later = SUBMISSION_WINDOW_MS + 100;
        let check = limiter.check_at(later);
        assert!(check.allowed);
        assert_eq!(check.remaining, 1);

        let check = limiter.check_at(later + 1);
        assert!(check.allowed);
        assert_eq!(check.remaining, 0);

        assert!(!limiter.check_at(later + 2).allowed);
    }

    #[test]
    fn test_garbage_ledger_treated_as_empty() {
        let store = MemoryStore::new();
        store.set(LEDGER_KEY, "not json");

        let check = RateLimiter::new(&store).check_at(1_000);
        assert!(check.allowed);
        assert_eq!(check.remaining, SUBMISSION_CAP - 1);
    }

    #[test]
    fn test_reset() {
        let store = MemoryStore::new();
        let limiter = RateLimiter::new(&store);

        limiter.check_at(1_000);
        assert!(store.get(LEDGER_KEY).is_some());

        limiter.reset();
        assert!(store.get(LEDGER_KEY).is_none());
    }
}
