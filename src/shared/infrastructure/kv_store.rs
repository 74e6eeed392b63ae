use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::debug;

/// Injected key-value abstraction with per-entry TTL.
///
/// Anything that previously wanted a module-level mutable map (short-lived
/// lookup results, verification codes) goes through this trait instead, so
/// lifecycle and testability stay explicit.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value; expired entries read as absent.
    async fn get(&self, key: &str) -> Option<JsonValue>;

    /// Set a value with a time-to-live.
    async fn set(&self, key: &str, value: JsonValue, ttl: Duration);

    /// Remove a value if present.
    async fn remove(&self, key: &str);

    /// Drop every expired entry; returns how many were removed.
    async fn purge_expired(&self) -> usize;
}

/// Cached entry with TTL support
#[derive(Debug, Clone)]
struct KvEntry {
    value: JsonValue,
    created_at: Instant,
    ttl: Duration,
}

impl KvEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// In-memory implementation backed by a concurrent map.
///
/// Expired entries are dropped lazily on read and via `purge_expired`.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    entries: DashMap<String, KvEntry>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Option<JsonValue> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => {
                debug!(key, "kv store hit");
                return Some(entry.value.clone());
            }
            None => {
                debug!(key, "kv store miss");
                return None;
            }
        };

        // Guard dropped above; safe to take the write path now.
        if expired {
            self.entries.remove(key);
            debug!(key, "kv store entry expired");
        }
        None
    }

    async fn set(&self, key: &str, value: JsonValue, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            KvEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    async fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }
}
