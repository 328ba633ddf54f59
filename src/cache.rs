use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{ Duration, Instant };

use serde::{ de::DeserializeOwned, Serialize };
use tokio::sync::RwLock;

use crate::error::{ AppError, Result };

/// Table names used as invalidation keys.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const TRANSACTIONS: &str = "transactions";
    pub const INVESTMENTS: &str = "investments";
    pub const NOTIFICATIONS: &str = "notifications";
}

const MAX_READ_ATTEMPTS: u32 = 3;
const READ_RETRY_BASE_DELAY_MS: u64 = 100;

/// Identifies one cached read and the tables it was computed from.
#[derive(Debug, Clone)]
pub struct QueryKey {
    name: String,
    tables: &'static [&'static str],
}

impl QueryKey {
    pub fn new(name: impl Into<String>, tables: &'static [&'static str]) -> Self {
        Self {
            name: name.into(),
            tables,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    value: serde_json::Value,
    tables: &'static [&'static str],
    fetched_at: Instant,
}

/// Read-through cache keyed by query, invalidated per table.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, CachedEntry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key` when younger than `ttl`, otherwise
    /// runs `fetch` and caches its result. Errors are never cached.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &QueryKey, ttl: Duration, fetch: F) -> Result<T>
        where T: Serialize + DeserializeOwned, F: FnOnce() -> Fut, Fut: Future<Output = Result<T>>
    {
        if let Some(value) = self.get_fresh::<T>(&key.name, ttl).await {
            return Ok(value);
        }

        let value = fetch().await?;

        match serde_json::to_value(&value) {
            Ok(json) => {
                let mut entries = self.entries.write().await;
                entries.insert(key.name.clone(), CachedEntry {
                    value: json,
                    tables: key.tables,
                    fetched_at: Instant::now(),
                });
            }
            Err(e) => tracing::warn!("Not caching query {}: {}", key.name, e),
        }

        Ok(value)
    }

    async fn get_fresh<T: DeserializeOwned>(&self, name: &str, ttl: Duration) -> Option<T> {
        let entries = self.entries.read().await;
        let cached = entries.get(name)?;

        if cached.fetched_at.elapsed() >= ttl {
            return None;
        }

        serde_json::from_value(cached.value.clone()).ok()
    }

    /// Drops every cached query that read from `table`.
    pub async fn invalidate(&self, table: &str) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.tables.contains(&table));
    }

    pub async fn invalidate_all(&self, tables: &[&str]) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.tables.iter().any(|t| tables.contains(t)));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Runs a read, retrying database failures with exponential backoff.
/// Only reads go through here; mutations are never retried.
pub async fn with_read_retry<T, F, Fut>(mut fetch: F) -> Result<T>
    where F: FnMut() -> Fut, Fut: Future<Output = Result<T>>
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match fetch().await {
            Err(AppError::Database(e)) if attempt < MAX_READ_ATTEMPTS => {
                let delay = READ_RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
                tracing::warn!("Read failed (attempt {}), retrying in {}ms: {}", attempt, delay, e);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            result => {
                return result;
            }
        }
    }
}
