use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::cache::PersistentCache;
use crate::models::{FactorKey, ProductRecord};

/// Resolved product records keyed by [`FactorKey::storage_key`].
/// At most one record per key; `upsert` creates or overwrites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, key: &FactorKey) -> Result<Option<ProductRecord>>;

    async fn upsert(&self, record: &ProductRecord) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryProductStore {
    records: RwLock<HashMap<String, ProductRecord>>,
}

impl InMemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get(&self, key: &FactorKey) -> Result<Option<ProductRecord>> {
        Ok(self.records.read().await.get(&key.storage_key()).cloned())
    }

    async fn upsert(&self, record: &ProductRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.key.storage_key(), record.clone());
        Ok(())
    }
}

/// Product records in the on-disk cache database. Records never expire.
pub struct PersistentProductStore {
    store: PersistentCache,
}

impl PersistentProductStore {
    #[must_use]
    pub fn new(store: PersistentCache) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductStore for PersistentProductStore {
    async fn get(&self, key: &FactorKey) -> Result<Option<ProductRecord>> {
        Ok(self.store.get(&key.storage_key()).await?)
    }

    async fn upsert(&self, record: &ProductRecord) -> Result<()> {
        self.store
            .put(&record.key.storage_key(), record.clone(), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheDatabase;
    use crate::models::{CarbonCategory, CarbonFactor, Provenance};
    use tempfile::TempDir;

    fn record(code: &str, factor: f64) -> ProductRecord {
        ProductRecord {
            key: FactorKey::barcode(code),
            name: "Oat Drink".to_string(),
            category: Some("beverages".to_string()),
            brand: None,
            factor: CarbonFactor::new(
                "beverages",
                CarbonCategory::Food,
                factor,
                "kgCO2e/kg",
                Provenance::OpenProductDatabase,
            ),
        }
    }

    #[tokio::test]
    async fn test_in_memory_upsert_overwrites() {
        let store = InMemoryProductStore::new();
        store.upsert(&record("123", 0.4)).await.unwrap();
        store.upsert(&record("123", 0.9)).await.unwrap();

        assert_eq!(store.len().await, 1);
        let hit = store.get(&FactorKey::barcode("123")).await.unwrap().unwrap();
        assert_eq!(hit.factor.factor, 0.9);
    }

    #[tokio::test]
    async fn test_barcode_and_label_keys_do_not_collide() {
        let store = InMemoryProductStore::new();
        store.upsert(&record("sushi", 0.4)).await.unwrap();
        assert!(store.get(&FactorKey::label("sushi")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persistent_round_trip() {
        let dir = TempDir::new().unwrap();
        let keyspace = CacheDatabase::open(dir.path())
            .unwrap()
            .keyspace("products")
            .unwrap();
        let store = PersistentProductStore::new(keyspace);

        store.upsert(&record("3017620422003", 5.37)).await.unwrap();
        let hit = store
            .get(&FactorKey::barcode("3017620422003"))
            .await
            .unwrap();
        assert_eq!(hit, Some(record("3017620422003", 5.37)));
    }
}
