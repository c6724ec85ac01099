use axum::http::HeaderMap;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::metrics::{RATE_LIMITED, THROTTLE_ENTRIES};

pub const UNKNOWN_CLIENT: &str = "unknown";

// Rate limit entry - tracks requests per IP/key
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct LimiterConfig {
    pub limit: u32,          // max requests per window
    pub window: Duration,    // length of a rate window
    pub stale_after: Duration, // sweep cutoff for idle entries
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            window: Duration::from_secs(60),
            stale_after: Duration::from_secs(60),
        }
    }
}

// Result of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
}

/// Fixed-window request counter keyed by client identifier.
///
/// Entries live in memory only. Each key is updated under its DashMap shard
/// lock, so counts for one client never interleave mid-update.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    config: LimiterConfig,
}

impl RateLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    pub fn check(&self, identifier: &str) -> RateLimitDecision {
        let now = Instant::now();
        let limit = self.config.limit;

        let mut entry = self
            .entries
            .entry(identifier.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // window expired..? Reset it
        if now.duration_since(entry.window_start) > self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        // over limit, the denied request is not counted
        if entry.count >= limit {
            drop(entry);
            RATE_LIMITED.inc();
            debug!(client = identifier, limit, "Rate limit exceeded");
            return RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
            };
        }

        entry.count += 1;
        let remaining = limit - entry.count;
        drop(entry);
        THROTTLE_ENTRIES.set(self.entries.len() as f64);

        RateLimitDecision {
            allowed: true,
            limit,
            remaining,
        }
    }

    // Drop every entry whose window started more than `stale_after` ago
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) <= self.config.stale_after);
        let after = self.entries.len();
        THROTTLE_ENTRIES.set(after as f64);
        before.saturating_sub(after)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Background sweep - runs every `sweep_interval` until cancelled
pub async fn sweeper(
    limiter: Arc<RateLimiter>,
    sweep_interval: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = interval(sweep_interval);

    info!(interval = ?sweep_interval, "Throttle sweeper started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Throttle sweeper stopped");
                return;
            }
            _ = interval.tick() => {
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(removed, remaining = limiter.len(), "Swept stale throttle entries");
                }
            }
        }
    }
}

/// Client key for throttling and analytics enrichment.
///
/// The `x-forwarded-for` value is used verbatim. A missing or empty header,
/// or one listing several hops, maps to `"unknown"`.
pub fn client_identifier(headers: &HeaderMap) -> String {
    match headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        Some(ip) if !ip.trim().is_empty() && !ip.contains(',') => ip.trim().to_string(),
        _ => UNKNOWN_CLIENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limiter() -> RateLimiter {
        RateLimiter::new(LimiterConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn sixth_request_in_window_is_denied() {
        let limiter = limiter();

        let remaining: Vec<u32> = (0..5)
            .map(|_| {
                let decision = limiter.check("10.0.0.1");
                assert!(decision.allowed);
                assert_eq!(decision.limit, 5);
                decision.remaining
            })
            .collect();
        assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

        let denied = limiter.check("10.0.0.1");
        assert_eq!(
            denied,
            RateLimitDecision {
                allowed: false,
                limit: 5,
                remaining: 0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn denied_requests_do_not_extend_the_count() {
        let limiter = limiter();
        for _ in 0..20 {
            limiter.check("a");
        }
        tokio::time::advance(Duration::from_secs(61)).await;

        let decision = limiter.check("a");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_it_elapses() {
        let limiter = limiter();
        for _ in 0..5 {
            assert!(limiter.check("a").allowed);
        }
        assert!(!limiter.check("a").allowed);

        // still inside the window at exactly 60s
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(!limiter.check("a").allowed);

        tokio::time::advance(Duration::from_millis(1)).await;
        let decision = limiter.check("a");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn identifiers_are_isolated() {
        let limiter = limiter();
        for _ in 0..6 {
            limiter.check("a");
        }
        assert!(!limiter.check("a").allowed);

        let decision = limiter.check("b");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_drops_entries_older_than_cutoff() {
        let limiter = limiter();
        limiter.check("old");
        tokio::time::advance(Duration::from_secs(45)).await;
        limiter.check("fresh");
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.len(), 1);

        // swept client starts a new window
        let decision = limiter.check("old");
        assert_eq!(decision.remaining, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_until_cancelled() {
        let limiter = Arc::new(limiter());
        let token = CancellationToken::new();
        let handle = tokio::spawn(sweeper(
            limiter.clone(),
            Duration::from_secs(3600),
            token.clone(),
        ));

        limiter.check("a");
        tokio::time::sleep(Duration::from_secs(3601)).await;
        assert!(limiter.is_empty());

        token.cancel();
        handle.await.unwrap();
    }

    #[test]
    fn identifier_comes_from_forwarded_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_identifier(&headers), "unknown");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(client_identifier(&headers), "203.0.113.7");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_identifier(&headers), "unknown");

        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_identifier(&headers), "unknown");
    }
}
