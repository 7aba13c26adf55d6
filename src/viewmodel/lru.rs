//! Bounded least-recently-used cache.
//!
//! Hash map for lookup plus a slab-backed doubly-linked list for recency
//! order: get, put and eviction are all O(1). The whole structure sits behind
//! a mutex so it can be shared between a view model's worker task and callers
//! resolving cached states.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

const NIL: usize = usize::MAX;

/// Thread-safe LRU cache with a fixed capacity.
pub struct LruCache<K, V> {
    inner: Mutex<LruInner<K, V>>,
}

struct LruInner<K, V> {
    capacity: usize,
    map: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    /// Most recently used entry.
    head: usize,
    /// Least recently used entry, evicted first.
    tail: usize,
}

struct Slot<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// # Panics
    /// Panics when `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LruCache capacity must be at least 1");
        Self {
            inner: Mutex::new(LruInner {
                capacity,
                map: HashMap::with_capacity(capacity),
                slots: Vec::with_capacity(capacity),
                free: Vec::new(),
                head: NIL,
                tail: NIL,
            }),
        }
    }

    /// Look up a key, marking it most recently used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let index = *inner.map.get(key)?;
        inner.unlink(index);
        inner.push_front(index);
        Some(inner.slots[index].value.clone())
    }

    /// Insert or replace a key, marking it most recently used and evicting
    /// the least recently used entry when over capacity.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.inner.lock();

        if let Some(&index) = inner.map.get(&key) {
            inner.slots[index].value = value;
            inner.unlink(index);
            inner.push_front(index);
            return;
        }

        if inner.map.len() == inner.capacity {
            let evicted = inner.tail;
            inner.unlink(evicted);
            let old_key = inner.slots[evicted].key.clone();
            inner.map.remove(&old_key);
            inner.free.push(evicted);
        }

        let index = match inner.free.pop() {
            Some(index) => {
                inner.slots[index] = Slot {
                    key: key.clone(),
                    value,
                    prev: NIL,
                    next: NIL,
                };
                index
            }
            None => {
                inner.slots.push(Slot {
                    key: key.clone(),
                    value,
                    prev: NIL,
                    next: NIL,
                });
                inner.slots.len() - 1
            }
        };
        inner.map.insert(key, index);
        inner.push_front(index);
    }

    /// Whether `key` is cached, without touching recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.lock().map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().map.is_empty()
    }
}

impl<K, V> LruInner<K, V> {
    /// Detach a slot from the recency list. No-op for an unlinked slot.
    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let slot = &self.slots[index];
            (slot.prev, slot.next)
        };

        if prev != NIL {
            self.slots[prev].next = next;
        } else if self.head == index {
            self.head = next;
        }

        if next != NIL {
            self.slots[next].prev = prev;
        } else if self.tail == index {
            self.tail = prev;
        }

        self.slots[index].prev = NIL;
        self.slots[index].next = NIL;
    }

    /// Attach a detached slot at the most-recently-used end.
    fn push_front(&mut self, index: usize) {
        self.slots[index].next = self.head;
        self.slots[index].prev = NIL;
        if self.head != NIL {
            self.slots[self.head].prev = index;
        }
        self.head = index;
        if self.tail == NIL {
            self.tail = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_over_capacity_evicts_least_recently_used() {
        let cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains_key(&"a"));
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        // Touch "a" so "b" becomes the eviction candidate.
        assert_eq!(cache.get(&"a"), Some(1));
        cache.put("c", 3);

        assert!(cache.contains_key(&"a"));
        assert!(!cache.contains_key(&"b"));
        assert!(cache.contains_key(&"c"));
    }

    #[test]
    fn test_put_existing_key_replaces_without_eviction() {
        let cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(10));
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[test]
    fn test_replacing_key_refreshes_recency() {
        let cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 10);
        cache.put("c", 3);

        assert!(cache.contains_key(&"a"));
        assert!(!cache.contains_key(&"b"));
    }

    #[test]
    fn test_capacity_one() {
        let cache = LruCache::new(1);
        cache.put(1, "one");
        cache.put(2, "two");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&2), Some("two"));
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 1")]
    fn test_zero_capacity_panics() {
        let _ = LruCache::<u32, u32>::new(0);
    }

    #[test]
    fn test_eviction_reuses_slots() {
        let cache = LruCache::new(2);
        for n in 0..100 {
            cache.put(n, n * 2);
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&99), Some(198));
        assert_eq!(cache.get(&98), Some(196));
        // The slab never grows past capacity even after many evictions.
        assert!(cache.inner.lock().slots.len() <= 2);
    }
}
