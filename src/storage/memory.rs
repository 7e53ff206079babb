use super::KeyValueStore;
use crate::error::AppResult;
use moka::sync::Cache;
use std::time::Duration;

/// Session-scoped storage: lives only as long as the process and drops idle entries.
pub struct MemoryStore {
    cache: Cache<String, String>,
}

impl MemoryStore {
    pub fn new(time_to_idle: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(100_000) // tune based on memory
                .time_to_idle(time_to_idle)
                .build(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key))
    }

    fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.cache.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key);
        Ok(())
    }

    fn keys(&self, prefix: &str) -> AppResult<Vec<String>> {
        Ok(self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.as_ref().clone())
            .collect())
    }
}
