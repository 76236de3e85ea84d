use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

/// Key/value store abstraction for the directory records (students,
/// professors, courses, accounts).
pub trait RecordStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn upsert(&self, key: K, value: V);
    fn remove(&self, key: &K) -> Option<V>;
    fn list(&self) -> Vec<V>;
    /// First record matching `predicate` (in no particular order).
    fn find(&self, predicate: &dyn Fn(&V) -> bool) -> Option<V>;

    fn any(&self, predicate: &dyn Fn(&V) -> bool) -> bool {
        self.find(predicate).is_some()
    }
}

impl<K, V, S> RecordStore<K, V> for Arc<S>
where
    S: RecordStore<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Option<V> {
        (**self).get(key)
    }

    fn upsert(&self, key: K, value: V) {
        (**self).upsert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        (**self).remove(key)
    }

    fn list(&self) -> Vec<V> {
        (**self).list()
    }

    fn find(&self, predicate: &dyn Fn(&V) -> bool) -> Option<V> {
        (**self).find(predicate)
    }
}

/// In-memory store for tests/dev.
#[derive(Debug)]
pub struct InMemoryRecordStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryRecordStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryRecordStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecordStore<K, V> for InMemoryRecordStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).cloned()
    }

    fn upsert(&self, key: K, value: V) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(key, value);
    }

    fn remove(&self, key: &K) -> Option<V> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(key)
    }

    fn list(&self) -> Vec<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().cloned().collect()
    }

    fn find(&self, predicate: &dyn Fn(&V) -> bool) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().find(|v| predicate(v)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_get_remove() {
        let store: InMemoryRecordStore<u32, String> = InMemoryRecordStore::new();
        store.upsert(1, "one".to_string());
        store.upsert(1, "uno".to_string());

        assert_eq!(store.get(&1), Some("uno".to_string()));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.remove(&1), Some("uno".to_string()));
        assert_eq!(store.get(&1), None);
        assert_eq!(store.remove(&1), None);
    }

    #[test]
    fn find_and_any_use_the_predicate() {
        let store: InMemoryRecordStore<u32, String> = InMemoryRecordStore::new();
        store.upsert(1, "alpha".to_string());
        store.upsert(2, "beta".to_string());

        assert_eq!(store.find(&|v| v.starts_with('b')), Some("beta".to_string()));
        assert!(store.any(&|v| v == "alpha"));
        assert!(!store.any(&|v| v == "gamma"));
    }
}
