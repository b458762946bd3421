use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use http::{HeaderMap, HeaderName, HeaderValue};

use super::clock::Clock;
use super::config::RateLimitConfig;

pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Per-client counter for the current window.
///
/// Authoritative only while `now < reset_at`; past that it counts as zero and is
/// replaced by a fresh entry on the client's next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitEntry {
    fn fresh(now: DateTime<Utc>, config: &RateLimitConfig) -> Self {
        Self {
            count: 0,
            reset_at: now + config.window_delta(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_at
    }
}

/// When to drop stale entries from the store.
///
/// Sweeping happens inline on the request path; there is no background timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepPolicy {
    #[default]
    EveryRequest,
    /// Only sweep once the store holds more than this many clients
    AboveEntries(usize),
    Never,
}

impl SweepPolicy {
    fn should_sweep(&self, entries: usize) -> bool {
        match self {
            Self::EveryRequest => true,
            Self::AboveEntries(limit) => entries > *limit,
            Self::Never => false,
        }
    }
}

/// Counter state reported with a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitStatus {
    /// `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset` (RFC 3339)
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_RATELIMIT_LIMIT.clone(), HeaderValue::from(self.limit));
        headers.insert(
            X_RATELIMIT_REMAINING.clone(),
            HeaderValue::from(self.remaining),
        );
        let reset = self.reset_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        if let Ok(value) = HeaderValue::from_str(&reset) {
            headers.insert(X_RATELIMIT_RESET.clone(), value);
        }
        headers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Admitted(RateLimitStatus),
    Rejected(RateLimitStatus),
}

impl RateLimitDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }
}

/// Fixed-window request counter keyed by client identifier.
///
/// Sweep, lookup, check and increment run under one lock, so concurrent
/// requests from the same client can never admit more than `max` per window.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    sweep: SweepPolicy,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>, sweep: SweepPolicy) -> Self {
        tracing::info!(
            "Creating rate limiter: {} requests per {:?}",
            config.max(),
            config.window()
        );
        Self {
            config,
            clock,
            sweep,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn check(&self, client_id: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let max = self.config.max();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if self.sweep.should_sweep(entries.len()) {
            let cutoff = now - self.config.window_delta();
            entries.retain(|_, entry| entry.reset_at >= cutoff);
        }

        let entry = entries
            .entry(client_id.to_string())
            .or_insert_with(|| RateLimitEntry::fresh(now, &self.config));
        if entry.is_expired(now) {
            *entry = RateLimitEntry::fresh(now, &self.config);
        }

        if entry.count >= max && entry.reset_at > now {
            tracing::debug!("Rejecting {}: {} requests in window", client_id, entry.count);
            return RateLimitDecision::Rejected(RateLimitStatus {
                limit: max,
                remaining: 0,
                reset_at: entry.reset_at,
            });
        }

        entry.count += 1;
        RateLimitDecision::Admitted(RateLimitStatus {
            limit: max,
            remaining: max - entry.count,
            reset_at: entry.reset_at,
        })
    }

    /// Stored entry for a client, expired or not
    pub fn entry(&self, client_id: &str) -> Option<RateLimitEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(client_id)
            .copied()
    }

    /// Number of clients currently stored
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::clock::ManualClock;
    use chrono::TimeDelta;
    use proptest::prelude::*;
    use std::time::Duration;

    fn limiter(max: u32, window_ms: u64, sweep: SweepPolicy) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::at_epoch();
        let config = RateLimitConfig::new(max, Duration::from_millis(window_ms)).unwrap();
        (RateLimiter::new(config, Arc::new(clock.clone()), sweep), clock)
    }

    #[test]
    fn test_two_per_second_scenario() {
        let (limiter, clock) = limiter(2, 1000, SweepPolicy::EveryRequest);

        assert!(limiter.check("A").is_admitted());
        clock.advance(TimeDelta::milliseconds(100));
        assert!(limiter.check("A").is_admitted());
        clock.advance(TimeDelta::milliseconds(100));
        match limiter.check("A") {
            RateLimitDecision::Rejected(status) => {
                assert_eq!(status.limit, 2);
                assert_eq!(status.remaining, 0);
                assert_eq!(status.reset_at.timestamp_millis(), 1000);
            }
            other => panic!("Expected rejection, got {other:?}"),
        }

        clock.set(DateTime::from_timestamp_millis(1200).unwrap());
        match limiter.check("A") {
            RateLimitDecision::Admitted(status) => {
                assert_eq!(status.remaining, 1);
                assert_eq!(status.reset_at.timestamp_millis(), 2200);
            }
            other => panic!("Expected admission, got {other:?}"),
        }
    }

    #[test]
    fn test_rejection_does_not_increment() {
        let (limiter, _clock) = limiter(1, 1000, SweepPolicy::EveryRequest);

        assert!(limiter.check("A").is_admitted());
        for _ in 0..5 {
            assert!(!limiter.check("A").is_admitted());
        }
        assert_eq!(limiter.entry("A").unwrap().count, 1);
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let (limiter, _clock) = limiter(1, 1000, SweepPolicy::EveryRequest);

        assert!(limiter.check("A").is_admitted());
        assert!(limiter.check("B").is_admitted());
        assert!(!limiter.check("A").is_admitted());
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn test_remaining_counts_down() {
        let (limiter, _clock) = limiter(3, 1000, SweepPolicy::EveryRequest);

        let remaining: Vec<u32> = (0..3)
            .map(|_| match limiter.check("A") {
                RateLimitDecision::Admitted(status) => status.remaining,
                RateLimitDecision::Rejected(_) => panic!("unexpected rejection"),
            })
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);
    }

    #[test]
    fn test_idle_client_collapses_to_fresh_entry() {
        let (limiter, clock) = limiter(2, 1000, SweepPolicy::Never);

        limiter.check("A");
        limiter.check("A");
        clock.advance(TimeDelta::milliseconds(10_500));

        assert!(limiter.check("A").is_admitted());
        let entry = limiter.entry("A").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.reset_at.timestamp_millis(), 11_500);
    }

    #[test]
    fn test_sweep_discards_entries_older_than_one_window() {
        let (limiter, clock) = limiter(5, 1000, SweepPolicy::EveryRequest);

        limiter.check("stale");
        clock.advance(TimeDelta::milliseconds(1500));
        limiter.check("B");
        // "stale" expired at 1000 but is within one window of now
        assert!(limiter.entry("stale").is_some());

        clock.advance(TimeDelta::milliseconds(600));
        limiter.check("B");
        assert!(limiter.entry("stale").is_none());
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_sweep_policies() {
        let (never, clock) = limiter(5, 1000, SweepPolicy::Never);
        never.check("old");
        clock.advance(TimeDelta::seconds(60));
        never.check("new");
        assert_eq!(never.len(), 2);

        let (bounded, clock) = limiter(5, 1000, SweepPolicy::AboveEntries(2));
        bounded.check("a");
        bounded.check("b");
        clock.advance(TimeDelta::seconds(60));
        bounded.check("c");
        assert_eq!(bounded.len(), 3);
        bounded.check("d");
        assert_eq!(bounded.len(), 2);
    }

    #[test]
    fn test_status_headers() {
        let status = RateLimitStatus {
            limit: 100,
            remaining: 0,
            reset_at: DateTime::from_timestamp_millis(900_000).unwrap(),
        };
        let headers = status.headers();
        assert_eq!(headers[&X_RATELIMIT_LIMIT], "100");
        assert_eq!(headers[&X_RATELIMIT_REMAINING], "0");
        assert_eq!(headers[&X_RATELIMIT_RESET], "1970-01-01T00:15:00.000Z");
    }

    #[test]
    fn test_concurrent_requests_at_the_edge_admit_exactly_one() {
        for _ in 0..50 {
            let (limiter, _clock) = limiter(3, 60_000, SweepPolicy::EveryRequest);
            let limiter = Arc::new(limiter);
            limiter.check("A");
            limiter.check("A");

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let limiter = limiter.clone();
                    std::thread::spawn(move || limiter.check("A").is_admitted())
                })
                .collect();
            let admitted = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|admitted| *admitted)
                .count();

            assert_eq!(admitted, 1);
        }
    }

    #[test]
    fn test_many_concurrent_requests_never_exceed_max() {
        let (limiter, _clock) = limiter(10, 60_000, SweepPolicy::EveryRequest);
        let limiter = Arc::new(limiter);

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.check("shared").is_admitted())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();

        assert_eq!(admitted, 10);
    }

    proptest! {
        #[test]
        fn prop_up_to_max_requests_in_one_window_are_admitted(
            max in 1u32..50,
            gaps in proptest::collection::vec(0i64..20, 0..50),
        ) {
            // Gaps sum to < 1000ms, so every request lands in the first window
            let (limiter, clock) = limiter(max, 1000, SweepPolicy::EveryRequest);
            let requests = gaps.len().min(max as usize);
            for gap in gaps.iter().take(requests) {
                clock.advance(TimeDelta::milliseconds(*gap));
                prop_assert!(limiter.check("client").is_admitted());
            }
        }

        #[test]
        fn prop_request_after_max_is_rejected(max in 1u32..50) {
            let (limiter, _clock) = limiter(max, 1000, SweepPolicy::EveryRequest);
            for _ in 0..max {
                prop_assert!(limiter.check("client").is_admitted());
            }
            match limiter.check("client") {
                RateLimitDecision::Rejected(status) => prop_assert_eq!(status.remaining, 0),
                RateLimitDecision::Admitted(_) => prop_assert!(false, "request {} admitted", max + 1),
            }
        }
    }
}
