//! Persistent key/value cache on top of fjall.
//!
//! Values are postcard-encoded and wrapped with an optional expiry. All fjall
//! calls run on the blocking pool.

use anyhow::{Result, anyhow};
use fjall::{Database, Keyspace};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: Option<u64>, // Unix timestamp (seconds)
}

/// An opened cache database. Hands out one [`PersistentCache`] per keyspace.
pub struct CacheDatabase {
    db: Database,
}

impl CacheDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(path.as_ref()).open()?;
        Ok(CacheDatabase { db })
    }

    /// Open (or create) a named keyspace
    pub fn keyspace(&self, name: &str) -> Result<PersistentCache> {
        let store = self.db.keyspace(name, fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache { store })
    }
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn scan_store(store: Keyspace, prefix: Vec<u8>) -> Result<Vec<Vec<u8>>> {
    store
        .prefix(prefix)
        .map(|guard| -> Result<Vec<u8>> { Ok(guard.value()?.to_vec()) })
        .collect()
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
}

impl PersistentCache {
    /// Stores a serializable value. `ttl = None` keeps it until overwritten.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = match ttl {
            Some(ttl) => Some(
                SystemTime::now()
                    .checked_add(ttl)
                    .ok_or(anyhow!("TTL overflow"))?
                    .duration_since(UNIX_EPOCH)?
                    .as_secs(),
            ),
            None => None,
        };
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        match entry.expires_at {
            Some(expires_at) if now_secs()? >= expires_at => {
                tracing::debug!("Key found but expired");
                self.remove(key).await?;
                Ok(None)
            }
            _ => {
                tracing::debug!("Key found and still fresh");
                Ok(Some(entry.value))
            }
        }
    }

    /// Fresh values whose key starts with `prefix`, in key order.
    /// Expired entries are skipped, not removed.
    #[tracing::instrument(name = "scan_cache", level = "debug", skip(self))]
    pub async fn scan_prefix<T: DeserializeOwned + Send + 'static>(
        &self,
        prefix: &str,
    ) -> Result<Vec<T>> {
        let store = self.store.clone();
        let prefix = prefix.as_bytes().to_vec();
        let raw = task::spawn_blocking(move || scan_store(store, prefix)).await??;

        let now = now_secs()?;
        let mut values = Vec::with_capacity(raw.len());
        for bytes in raw {
            let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
            if entry.expires_at.is_none_or(|expires_at| now < expires_at) {
                values.push(entry.value);
            }
        }
        tracing::debug!(count = values.len(), "Prefix scan done");
        Ok(values)
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}
