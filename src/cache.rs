// --- File: cache.rs ---
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Keyed store that constructs each entry at most once.
///
/// There is no eviction; entries live as long as the cache. Values are handed
/// out as `Arc` so renderable items can share them.
#[derive(Debug)]
pub struct ResourceCache<K, V> {
    entries: HashMap<K, Arc<V>>,
}

impl<K: Eq + Hash, V> Default for ResourceCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> ResourceCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `key`, building it with `factory` on first use.
    ///
    /// A failing factory leaves the cache untouched and its error is returned.
    pub fn get_or_create<E, F>(&mut self, key: K, factory: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(existing) = self.entries.get(&key) {
            return Ok(Arc::clone(existing));
        }
        let value = Arc::new(factory(&key)?);
        self.entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_runs_once_per_key() {
        let mut cache: ResourceCache<String, usize> = ResourceCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_create("diffuse:rock.png".to_string(), |_| {
                    calls += 1;
                    Ok::<_, ()>(calls)
                })
                .unwrap();
            assert_eq!(*value, 1);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_get_distinct_entries() {
        let mut cache: ResourceCache<&str, String> = ResourceCache::new();
        let a = cache
            .get_or_create("a", |k| Ok::<_, ()>(k.to_uppercase()))
            .unwrap();
        let b = cache
            .get_or_create("b", |k| Ok::<_, ()>(k.to_uppercase()))
            .unwrap();
        assert_eq!(a.as_str(), "A");
        assert_eq!(b.as_str(), "B");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn shared_entries_point_to_same_allocation() {
        let mut cache: ResourceCache<u32, Vec<u8>> = ResourceCache::new();
        let first = cache.get_or_create(7, |_| Ok::<_, ()>(vec![1, 2])).unwrap();
        let second = cache.get_or_create(7, |_| Ok::<_, ()>(vec![9])).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn hits_never_call_the_factory() {
        let mut cache: ResourceCache<&str, u32> = ResourceCache::new();
        cache.get_or_create("tank:inner", |_| Ok::<_, &str>(3)).unwrap();
        let hit = cache.get_or_create("tank:inner", |_| -> Result<u32, &str> {
            panic!("factory must not run on a hit")
        });
        assert_eq!(*hit.unwrap(), 3);
    }

    #[test]
    fn failed_factory_stores_nothing() {
        let mut cache: ResourceCache<u32, u32> = ResourceCache::new();
        let err = cache.get_or_create(1, |_| Err::<u32, _>("decode failed"));
        assert_eq!(err.unwrap_err(), "decode failed");
        assert_eq!(cache.len(), 0);
        let ok = cache.get_or_create(1, |_| Ok::<_, &str>(5)).unwrap();
        assert_eq!(*ok, 5);
    }
}
// --- End of File: cache.rs ---
