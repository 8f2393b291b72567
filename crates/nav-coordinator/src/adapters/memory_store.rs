use crate::error::NavResult;
use crate::ports::outbound::KeyValueStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory key-value store.
///
/// Session-lifetime storage, the analogue of browser session storage. Also
/// the default store in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Synchronous read used by tests and diagnostics.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.data.read().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> NavResult<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> NavResult<()> {
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> NavResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    async fn keys(&self) -> NavResult<Vec<String>> {
        Ok(self.data.read().keys().cloned().collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> NavResult<()> {
        let mut data = self.data.write();
        for key in keys {
            data.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);

        store.set("a", "1".to_string()).await.unwrap();
        store.set("b", "2".to_string()).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));
        assert_eq!(store.len(), 2);

        store.remove("a").await.unwrap();
        store.remove("missing").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_multi_remove() {
        let store = InMemoryStore::new();
        for key in ["x", "y", "z"] {
            store.set(key, key.to_string()).await.unwrap();
        }
        store
            .multi_remove(&["x".to_string(), "z".to_string()])
            .await
            .unwrap();
        assert_eq!(store.snapshot("y"), Some("y".to_string()));
        assert_eq!(store.len(), 1);
    }
}
