use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::RngExt;
use tokio::sync::RwLock;

use super::{GeocodingCache, normalize_address};
use crate::Result;
use crate::cache::PersistentCache;
use crate::models::GeocodeResult;

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Process-local cache. Entries older than the TTL are ignored.
pub struct InMemoryGeocodingCache {
    entries: RwLock<HashMap<String, (GeocodeResult, Instant)>>,
    ttl: Option<Duration>,
}

impl InMemoryGeocodingCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Some(DEFAULT_TTL))
    }

    /// `None` keeps entries forever
    #[must_use]
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_expired(&self, stored_at: Instant) -> bool {
        self.ttl.is_some_and(|ttl| stored_at.elapsed() >= ttl)
    }
}

impl Default for InMemoryGeocodingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodingCache for InMemoryGeocodingCache {
    async fn get(&self, address: &str) -> Result<Option<GeocodeResult>> {
        let key = normalize_address(address);
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                None => return Ok(None),
                Some((result, stored_at)) if !self.is_expired(*stored_at) => {
                    return Ok(Some(result.clone()));
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // another writer may have refreshed the entry in between
        if entries
            .get(&key)
            .is_some_and(|(_, stored_at)| self.is_expired(*stored_at))
        {
            entries.remove(&key);
        }
        Ok(None)
    }

    async fn put(&self, address: &str, result: &GeocodeResult) -> Result<()> {
        let key = normalize_address(address);
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, stored_at)| !self.is_expired(*stored_at));
        entries.insert(key, (result.clone(), Instant::now()));
        Ok(())
    }
}

/// Geocode cache stored in the on-disk cache database
pub struct PersistentGeocodingCache {
    store: PersistentCache,
    ttl_hours: u32,
}

impl PersistentGeocodingCache {
    #[must_use]
    pub fn new(store: PersistentCache, ttl_hours: u32) -> Self {
        Self { store, ttl_hours }
    }

    // 0.9 to 1.1 of the configured TTL
    fn jittered_ttl(&self) -> Duration {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        Duration::from_secs_f64(f64::from(self.ttl_hours) * 3600.0 * jitter)
    }
}

#[async_trait]
impl GeocodingCache for PersistentGeocodingCache {
    async fn get(&self, address: &str) -> Result<Option<GeocodeResult>> {
        Ok(self.store.get(&normalize_address(address)).await?)
    }

    async fn put(&self, address: &str, result: &GeocodeResult) -> Result<()> {
        self.store
            .put(
                &normalize_address(address),
                result.clone(),
                Some(self.jittered_ttl()),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheDatabase;
    use tempfile::TempDir;

    fn marina_bay() -> GeocodeResult {
        GeocodeResult {
            latitude: 1.2834,
            longitude: 103.8607,
            formatted_address: "10 Bayfront Ave, Singapore 018956".to_string(),
            city: Some("Singapore".to_string()),
            country: Some("Singapore".to_string()),
        }
    }

    #[tokio::test]
    async fn test_in_memory_lookup_is_case_insensitive() {
        let cache = InMemoryGeocodingCache::new();
        cache.put("Marina Bay Sands", &marina_bay()).await.unwrap();

        let hit = cache.get("  marina bay sands").await.unwrap();
        assert_eq!(hit, Some(marina_bay()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_in_memory_miss_is_not_an_error() {
        let cache = InMemoryGeocodingCache::default();
        assert!(cache.get("Nowhere").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_in_memory_entries_expire() {
        let cache = InMemoryGeocodingCache::with_ttl(Some(Duration::ZERO));
        cache.put("Marina Bay Sands", &marina_bay()).await.unwrap();
        assert!(cache.get("Marina Bay Sands").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_expired_entries_are_dropped() {
        let cache = InMemoryGeocodingCache::with_ttl(Some(Duration::ZERO));
        for i in 0..1000 {
            cache.put(&format!("{i} Orchard Road"), &marina_bay()).await.unwrap();
        }
        assert_eq!(cache.len().await, 1);

        for i in 0..1000 {
            assert!(cache.get(&format!("{i} Orchard Road")).await.unwrap().is_none());
        }
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_in_memory_put_keeps_fresh_entries() {
        let cache = InMemoryGeocodingCache::with_ttl(Some(Duration::from_secs(3600)));
        cache.put("Marina Bay Sands", &marina_bay()).await.unwrap();
        cache.put("Raffles Hotel", &marina_bay()).await.unwrap();
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_persistent_cache_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CacheDatabase::open(dir.path())
            .unwrap()
            .keyspace("geocode")
            .unwrap();
        let cache = PersistentGeocodingCache::new(store, 24);

        cache.put("Marina Bay Sands", &marina_bay()).await.unwrap();
        let hit = cache.get("MARINA BAY SANDS").await.unwrap();
        assert_eq!(hit, Some(marina_bay()));
    }

    #[test]
    fn test_jittered_ttl_stays_within_ten_percent() {
        let dir = TempDir::new().unwrap();
        let store = CacheDatabase::open(dir.path())
            .unwrap()
            .keyspace("geocode")
            .unwrap();
        let cache = PersistentGeocodingCache::new(store, 10);

        for _ in 0..50 {
            let ttl = cache.jittered_ttl().as_secs_f64();
            assert!((32_400.0..=39_600.0).contains(&ttl));
        }
    }
}
