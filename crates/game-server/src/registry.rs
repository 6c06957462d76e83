//! Keyed map of shared entries behind one reader/writer lock.
//!
//! Lookups hand out `Arc` clones, so the map lock is held only for the
//! lookup itself and never while the caller works with the entry.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::guarded::Guarded;

#[derive(Debug)]
pub struct Registry<K, V> {
    entries: Guarded<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            entries: Guarded::new(HashMap::new()),
        }
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry. An occupied key is left untouched and the value
    /// is handed back.
    pub async fn insert(&self, key: K, value: V) -> Result<Arc<V>, V> {
        self.entries
            .write(|map| {
                if map.contains_key(&key) {
                    return Err(value);
                }
                let entry = Arc::new(value);
                map.insert(key, entry.clone());
                Ok(entry)
            })
            .await
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.read(|map| map.get(key).cloned()).await
    }

    pub async fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.entries.write(|map| map.remove(key)).await
    }

    /// Remove the entry only if `pred` accepts it, atomically with the check.
    pub async fn remove_if(&self, key: &K, pred: impl FnOnce(&V) -> bool) -> Option<Arc<V>> {
        self.entries
            .write(|map| {
                if map.get(key).is_some_and(|entry| pred(entry.as_ref())) {
                    map.remove(key)
                } else {
                    None
                }
            })
            .await
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.entries.read(|map| map.contains_key(key)).await
    }

    pub async fn len(&self) -> usize {
        self.entries.read(HashMap::len).await
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read(HashMap::is_empty).await
    }

    pub async fn keys(&self) -> Vec<K> {
        self.entries.read(|map| map.keys().cloned().collect()).await
    }

    pub async fn snapshot(&self) -> Vec<(K, Arc<V>)> {
        self.entries
            .read(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_rejects_duplicates() {
        let registry: Registry<u64, String> = Registry::new();
        assert!(registry.insert(1, "first".to_string()).await.is_ok());
        let rejected = registry.insert(1, "second".to_string()).await;
        assert_eq!(rejected.unwrap_err(), "second");
        assert_eq!(registry.get(&1).await.as_deref().map(String::as_str), Some("first"));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_returns_entry_once() {
        let registry: Registry<u64, u32> = Registry::new();
        registry.insert(7, 42).await.unwrap();
        assert_eq!(registry.remove(&7).await.as_deref(), Some(&42));
        assert!(registry.remove(&7).await.is_none());
        assert!(!registry.contains(&7).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_if() {
        let registry: Registry<&'static str, u32> = Registry::new();
        registry.insert("a", 1).await.unwrap();
        assert!(registry.remove_if(&"a", |v| *v == 2).await.is_none());
        assert!(registry.contains(&"a").await);
        assert!(registry.remove_if(&"a", |v| *v == 1).await.is_some());
        assert!(registry.keys().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_removal_has_one_winner() {
        let registry = Arc::new(Registry::<u64, u32>::new());
        registry.insert(1, 1).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.remove(&1).await.is_some() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
