//! In-process [`KeyValueStore`].
//!
//! Keys live in an ordered map behind a tokio mutex. Expiry is evaluated
//! lazily against `tokio::time::Instant`, so tests can drive it with a paused
//! clock. A scan cursor names the last key of the previous page, so a key that
//! lives for the whole scan is returned even if others are deleted meanwhile.

use crate::error::{Error, Result};
use crate::pattern::KeyPattern;
use crate::store::{KeyValueStore, ScanPage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct StoredValue {
    content: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Persisted form of one key. The deadline is wall-clock milliseconds since
/// the Unix epoch so it stays meaningful across processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
}

impl SnapshotEntry {
    pub fn persistent(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            expires_at_ms: None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, StoredValue>,
    /// Open scan cursors and the last key each one returned
    cursors: HashMap<u64, String>,
    last_cursor: u64,
}

impl State {
    /// Look up a key, dropping it first if it has expired
    fn live_entry(&mut self, key: &str, now: Instant) -> Option<&mut StoredValue> {
        if self.entries.get(key).is_some_and(|v| !v.is_live(now)) {
            _ = self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, value| value.is_live(now));
    }

    fn open_cursor(&mut self, last_key: String) -> u64 {
        self.last_cursor = self.last_cursor.wrapping_add(1).max(1);
        _ = self.cursors.insert(self.last_cursor, last_key);
        self.last_cursor
    }
}

fn unix_millis(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Shared in-memory store. Clones see the same data.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    offline: Arc<AtomicBool>,
    deletes_failing: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            offline: Arc::new(AtomicBool::new(false)),
            deletes_failing: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            page_size: 0,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every scan to return at most `page_size` keys per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Seed a store from a snapshot taken with [`MemoryStore::snapshot`].
    ///
    /// Entries whose deadline has already passed are dropped.
    pub fn from_snapshot(snapshot: HashMap<String, SnapshotEntry>) -> Self {
        let now = Instant::now();
        let wall_now = SystemTime::now();
        let entries = snapshot
            .into_iter()
            .filter_map(|(key, entry)| {
                let expires_at = match entry.expires_at_ms {
                    None => None,
                    Some(ms) => {
                        let deadline = UNIX_EPOCH + Duration::from_millis(ms);
                        let remaining = deadline.duration_since(wall_now).ok()?;
                        if remaining.is_zero() {
                            return None;
                        }
                        Some(now + remaining)
                    }
                };
                let value = StoredValue {
                    content: entry.content,
                    expires_at,
                };
                Some((key, value))
            })
            .collect();
        Self {
            state: Arc::new(Mutex::new(State {
                entries,
                ..State::default()
            })),
            ..Self::default()
        }
    }

    /// Every live key with its content and wall-clock deadline
    pub async fn snapshot(&self) -> HashMap<String, SnapshotEntry> {
        let now = Instant::now();
        let wall_now = SystemTime::now();
        let mut state = self.state.lock().await;
        state.purge_expired(now);
        state
            .entries
            .iter()
            .map(|(key, value)| {
                let expires_at_ms = value
                    .expires_at
                    .map(|at| unix_millis(wall_now + at.saturating_duration_since(now)));
                let entry = SnapshotEntry {
                    content: value.content.clone(),
                    expires_at_ms,
                };
                (key.clone(), entry)
            })
            .collect()
    }

    /// Remaining time to live of a key, `None` if absent or persistent
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        state
            .live_entry(key, now)
            .and_then(|value| value.expires_at)
            .map(|at| at - now)
    }

    /// Simulate a lost connection: every primitive fails while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make only deletions fail, leaving reads and writes working
    pub fn set_deletes_failing(&self, failing: bool) {
        self.deletes_failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("connection closed"));
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("connection refused"));
        }
        Ok(())
    }

    async fn store_value(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        self.check_available()?;
        let expires_at = ttl.map(|secs| Instant::now() + Duration::from_secs(secs));
        _ = self.state.lock().await.entries.insert(
            key.to_string(),
            StoredValue {
                content: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        Ok(state
            .live_entry(key, Instant::now())
            .map(|value| value.content.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.store_value(key, value, None).await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        self.store_value(key, value, Some(ttl_seconds)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        Ok(state.live_entry(key, Instant::now()).is_some())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        self.check_available()?;
        if self.deletes_failing.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("delete rejected"));
        }
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let mut removed = 0;
        for key in keys {
            if state.live_entry(key, now).is_some() {
                _ = state.entries.remove(key);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        self.check_available()?;
        let page_size = match self.page_size {
            0 => count.max(1),
            forced => forced,
        };
        let matcher = KeyPattern::parse(pattern);
        let prefix = matcher.literal_prefix();

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.purge_expired(Instant::now());

        let lower = match cursor {
            0 => Bound::Included(prefix.to_string()),
            cursor => Bound::Excluded(
                state
                    .cursors
                    .remove(&cursor)
                    .ok_or_else(|| Error::store_unavailable(format!("unknown scan cursor {cursor}")))?,
            ),
        };
        let mut candidates = state
            .entries
            .range::<String, _>((lower, Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix));
        let visited: Vec<String> = candidates.by_ref().take(page_size).cloned().collect();
        let more = candidates.next().is_some();

        let keys = visited
            .iter()
            .filter(|key| matcher.matches(key))
            .cloned()
            .collect();
        let cursor = match visited.last() {
            Some(last) if more => state.open_cursor(last.clone()),
            _ => 0,
        };

        Ok(ScanPage { cursor, keys })
    }

    async fn refresh_expiry(&self, key: &str, ttl_seconds: u64) -> Result<()> {
        self.check_available()?;
        let now = Instant::now();
        let mut state = self.state.lock().await;
        if let Some(value) = state.live_entry(key, now) {
            value.expires_at = Some(now + Duration::from_secs(ttl_seconds));
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
