// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fixed-window request rate limiting.
//!
//! Counters live behind the [`RateLimitStore`] trait so that the limiter can
//! be driven by an injected clock in tests. The default store is process
//! local and is not shared between server instances.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};

use num_traits::ToPrimitive;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

/// Number of booking creations accepted per client per window.
pub const DEFAULT_BOOKING_LIMIT: u32 = 3;

/// Length of the booking creation window in seconds.
pub const DEFAULT_BOOKING_WINDOW_SECS: u64 = 300;

/// Identity used when no client address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// The request was refused because the client used up its window.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Rate limit exceeded; retry after {retry_after_secs} seconds")]
pub struct RateLimitExceeded {
    /// Seconds until the window resets, between 1 and the window length.
    pub retry_after_secs: u64,
}

/// Counter state after an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCount {
    /// Requests counted in the current window, including this one.
    pub count: u32,
    /// When the current window ends.
    pub reset_at: OffsetDateTime,
}

/// Storage for per-key request counters.
pub trait RateLimitStore: Send + Sync {
    /// Counts one request for `key`, opening a new window of length `window`
    /// if none is open at `now`.
    fn increment(&self, key: &str, window: Duration, now: OffsetDateTime) -> RateLimitCount;

    /// Drops every counter whose window has ended by `now`.
    ///
    /// Returns the number of counters removed.
    fn sweep(&self, now: OffsetDateTime) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: OffsetDateTime,
}

/// Mutex-guarded in-process counter map.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live counters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no counters are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn increment(&self, key: &str, window: Duration, now: OffsetDateTime) -> RateLimitCount {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry: &mut RateLimitEntry = entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                reset_at: now + window,
            });

        if entry.reset_at <= now {
            entry.count = 0;
            entry.reset_at = now + window;
        }
        entry.count = entry.count.saturating_add(1);

        RateLimitCount {
            count: entry.count,
            reset_at: entry.reset_at,
        }
    }

    fn sweep(&self, now: OffsetDateTime) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before: usize = entries.len();
        entries.retain(|_, entry| entry.reset_at > now);
        before - entries.len()
    }
}

/// How many requests a client may make in a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Counter namespace, so that policies do not share budgets.
    pub name: &'static str,
    /// Requests accepted per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Booking creation and payment claims at the default limits.
    #[must_use]
    pub fn booking() -> Self {
        Self::booking_with(DEFAULT_BOOKING_LIMIT, DEFAULT_BOOKING_WINDOW_SECS)
    }

    /// A booking policy with custom limits.
    #[must_use]
    pub fn booking_with(max_requests: u32, window_secs: u64) -> Self {
        Self {
            name: "booking",
            max_requests: max_requests.max(1),
            window: Duration::seconds(window_secs.max(1).to_i64().unwrap_or(i64::MAX)),
        }
    }
}

/// Enforces a [`RateLimitPolicy`] against a shared store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    /// Creates a limiter over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// Creates a limiter over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRateLimitStore::new()))
    }

    /// Counts a request from `client_id` and checks it against `policy`.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitExceeded` once the client has used up the window.
    pub fn check(
        &self,
        policy: &RateLimitPolicy,
        client_id: &str,
        now: OffsetDateTime,
    ) -> Result<RateLimitCount, RateLimitExceeded> {
        let key: String = format!("{}:{client_id}", policy.name);
        let counted: RateLimitCount = self.store.increment(&key, policy.window, now);

        if counted.count > policy.max_requests {
            let window_secs: u64 = policy.window.whole_seconds().to_u64().unwrap_or(1).max(1);
            let remaining: Duration = counted.reset_at - now;
            let mut retry_after_secs: u64 = remaining.whole_seconds().to_u64().unwrap_or(0);
            if remaining.subsec_nanoseconds() > 0 {
                retry_after_secs += 1;
            }
            let retry_after_secs: u64 = retry_after_secs.clamp(1, window_secs);

            warn!(
                policy = policy.name,
                client_id,
                count = counted.count,
                retry_after_secs,
                "Rate limit exceeded"
            );
            return Err(RateLimitExceeded { retry_after_secs });
        }

        debug!(policy = policy.name, client_id, count = counted.count, "Request counted");
        Ok(counted)
    }

    /// Drops expired counters.
    pub fn sweep(&self, now: OffsetDateTime) -> usize {
        let removed: usize = self.store.sweep(now);
        debug!(removed, "Swept rate limit counters");
        removed
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

/// Determines the client identity a request is counted under.
///
/// When proxy headers are trusted the first of `cf-connecting-ip`,
/// `x-real-ip`, the first hop of `x-forwarded-for` and `x-client-ip` wins.
/// Otherwise, or when none is present, the peer address is used.
pub fn resolve_client_id<'a, F>(
    header: F,
    peer: Option<IpAddr>,
    trust_proxy_headers: bool,
) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    if trust_proxy_headers {
        let candidates: [Option<&str>; 4] = [
            header("cf-connecting-ip"),
            header("x-real-ip"),
            header("x-forwarded-for").and_then(|v| v.split(',').next()),
            header("x-client-ip"),
        ];
        if let Some(found) = candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
        {
            return found.to_string();
        }
    }

    peer.map_or_else(|| UNKNOWN_CLIENT.to_string(), |ip| ip.to_string())
}
