//! Short-lived request cache that collapses duplicate chat submissions.
//!
//! Entries live for a fixed TTL. Expired entries read as misses right away and
//! are physically removed by [`RequestCache::sweep`], which
//! [`spawn_sweeper`] runs on an interval. At capacity, inserting a new key
//! evicts the entry with the oldest timestamp, ties going to the entry
//! inserted first.
//!
//! The cache is advisory: a poisoned lock reads as a miss and drops writes, so
//! it can never block the real remote call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::companion::types::CompanionId;
use crate::remote::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub key: String,
    /// [`Clock::now_ms`] at insertion.
    pub timestamp: u64,
    /// Insertion order. Breaks eviction ties between equal timestamps.
    pub seq: u64,
    pub response: String,
}

/// Shortest sweep period [`spawn_sweeper`] will run with.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

pub struct RequestCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl_ms: u64,
    capacity: usize,
    next_seq: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl RequestCache {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl_ms: ttl.as_millis() as u64,
            capacity: capacity.max(1),
            next_seq: AtomicU64::new(0),
            clock,
        }
    }

    /// Cached response for `key` if present and no older than the TTL.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let now = self.clock.now_ms();
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "request cache lock poisoned, treating as miss");
                return None;
            }
        };
        entries
            .get(key)
            .filter(|entry| now.saturating_sub(entry.timestamp) <= self.ttl_ms)
            .map(|entry| entry.response.clone())
    }

    /// Insert or overwrite `key`, evicting the oldest entry when a new key
    /// would exceed capacity.
    pub fn store(&self, key: impl Into<String>, response: impl Into<String>) {
        let key = key.into();
        let now = self.clock.now_ms();
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "request cache lock poisoned, dropping write");
                return;
            }
        };

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .values()
                .min_by_key(|entry| (entry.timestamp, entry.seq))
                .map(|entry| entry.key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key.clone(),
            CacheEntry {
                key,
                timestamp: now,
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                response: response.into(),
            },
        );
    }

    /// Remove every entry older than the TTL. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "request cache lock poisoned, skipping sweep");
                return 0;
            }
        };
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_sub(entry.timestamp) <= self.ttl_ms);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

/// Run [`RequestCache::sweep`] every `interval` until the task is aborted.
///
/// Intervals shorter than [`MIN_SWEEP_INTERVAL`] (including zero) are raised
/// to it.
pub fn spawn_sweeper(cache: Arc<RequestCache>, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.sweep();
            if removed > 0 {
                tracing::debug!(
                    removed,
                    remaining = cache.len(),
                    "swept expired chat cache entries"
                );
            }
        }
    })
}

/// Build the dedup key for a chat request.
///
/// Format: `{companion}:{message}:{h1}|{h2}|{h3}` where the message and each
/// of the last `history_window` history entries are cut to their first
/// `truncate_chars` characters (Unicode scalar values, not bytes).
pub fn request_key(
    companion: CompanionId,
    message: &str,
    history: &[ChatMessage],
    truncate_chars: usize,
    history_window: usize,
) -> String {
    let start = history.len().saturating_sub(history_window);
    let recent: Vec<String> = history[start..]
        .iter()
        .map(|m| truncate(&m.content, truncate_chars))
        .collect();
    format!(
        "{}:{}:{}",
        companion.as_str(),
        truncate(message, truncate_chars),
        recent.join("|")
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
