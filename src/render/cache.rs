//! Bounded caches owned by a [`CacheManager`].
//!
//! Every cache is size-capped and evicts the least recently used entry.
//! Nothing here is process-global; a manager is created per grid and
//! injected into the scene root.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use super::colors::lighten_css;
use super::sprites::SpriteCache;
use crate::types::CacheLimits;

struct Slot<V> {
    value: V,
    stamp: u64,
}

/// A fixed-capacity cache evicting the least recently used entry.
///
/// Both lookups and inserts refresh recency. A capacity of 0 disables
/// caching entirely.
pub struct LruCache<K: Hash + Eq + Clone, V> {
    entries: HashMap<K, Slot<V>>,
    /// Recency stamp to key; the first entry is the eviction candidate.
    order: BTreeMap<u64, K>,
    capacity: usize,
    tick: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            capacity,
            tick: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Look up a value and mark it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key).map(|v| &*v)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.capacity == 0 {
            return None;
        }
        let tick = self.next_tick();
        let slot = self.entries.get_mut(key)?;
        if let Some(k) = self.order.remove(&slot.stamp) {
            self.order.insert(tick, k);
        }
        slot.stamp = tick;
        Some(&mut slot.value)
    }

    /// Look up a value without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|slot| &slot.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Insert or replace a value. Returns the entry evicted to make room,
    /// if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }
        let tick = self.next_tick();
        if let Some(slot) = self.entries.get_mut(&key) {
            self.order.remove(&slot.stamp);
            slot.value = value;
            slot.stamp = tick;
            self.order.insert(tick, key);
            return None;
        }
        self.entries.insert(key.clone(), Slot { value, stamp: tick });
        self.order.insert(tick, key);
        if self.entries.len() > self.capacity {
            return self.evict_oldest();
        }
        None
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.entries.remove(key)?;
        self.order.remove(&slot.stamp);
        Some(slot.value)
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting least recently used entries as needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > self.capacity {
            if self.evict_oldest().is_none() {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Text widths keyed by font and string.
pub struct TextMetricsCache {
    widths: LruCache<String, f32>,
    scratch: String,
}

impl TextMetricsCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            widths: LruCache::new(capacity),
            scratch: String::new(),
        }
    }

    fn build_key<'a>(scratch: &'a mut String, font: &str, text: &str) -> &'a str {
        scratch.clear();
        scratch.reserve(font.len() + 1 + text.len());
        scratch.push_str(font);
        scratch.push('\n');
        scratch.push_str(text);
        scratch.as_str()
    }

    pub fn get(&mut self, font: &str, text: &str) -> Option<f32> {
        let key = Self::build_key(&mut self.scratch, font, text);
        self.widths.get(key).copied()
    }

    pub fn insert(&mut self, font: &str, text: &str, width: f32) {
        let key = Self::build_key(&mut self.scratch, font, text).to_string();
        self.widths.insert(key, width);
    }

    /// Cached width, or measure with `measure` and remember the result.
    pub fn width_with(&mut self, font: &str, text: &str, measure: impl FnOnce() -> f32) -> f32 {
        if let Some(w) = self.get(font, text) {
            return w;
        }
        let w = measure();
        self.insert(font, text, w);
        w
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn clear(&mut self) {
        self.widths.clear();
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.widths.set_capacity(capacity);
    }
}

/// Lightened variants of theme colors.
pub struct ColorCache {
    colors: LruCache<(String, u32), String>,
}

impl ColorCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            colors: LruCache::new(capacity),
        }
    }

    /// `color` blended toward white by `factor`.
    pub fn lighten(&mut self, color: &str, factor: f32) -> String {
        let key = (color.to_string(), factor.to_bits());
        if let Some(hit) = self.colors.get(&key) {
            return hit.clone();
        }
        let value = lighten_css(color, factor);
        self.colors.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.colors.set_capacity(capacity);
    }
}

/// Owner of every render-side cache for one grid instance.
pub struct CacheManager {
    pub text: TextMetricsCache,
    pub colors: ColorCache,
    pub sprites: SpriteCache,
}

impl CacheManager {
    pub fn new(limits: &CacheLimits) -> Self {
        Self {
            text: TextMetricsCache::new(limits.text_metrics),
            colors: ColorCache::new(limits.colors),
            sprites: SpriteCache::new(limits.sprites),
        }
    }

    pub fn set_limits(&mut self, limits: &CacheLimits) {
        self.text.set_capacity(limits.text_metrics);
        self.colors.set_capacity(limits.colors);
        self.sprites.set_capacity(limits.sprites);
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.colors.colors.clear();
        self.sprites.clear();
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(&CacheLimits::default())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_insert_get() {
        let mut cache: LruCache<String, i32> = LruCache::new(3);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.get("a"), Some(&1));
        assert_eq!(cache.get("b"), Some(&2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache: LruCache<String, i32> = LruCache::new(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        // Touch "a" so "b" becomes the oldest.
        assert_eq!(cache.get("a"), Some(&1));
        let evicted = cache.insert("c".to_string(), 3);
        assert_eq!(evicted, Some(("b".to_string(), 2)));
        assert!(cache.contains_key("a"));
        assert!(!cache.contains_key("b"));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache: LruCache<&str, i32> = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.peek("a"), Some(&1));
        cache.insert("c", 3);
        assert!(!cache.contains_key("a"));
    }

    #[test]
    fn test_insert_replaces() {
        let mut cache: LruCache<&str, i32> = LruCache::new(2);
        cache.insert("a", 1);
        assert_eq!(cache.insert("a", 5), None);
        assert_eq!(cache.peek("a"), Some(&5));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity() {
        let mut cache: LruCache<String, i32> = LruCache::new(0);
        assert_eq!(cache.insert("a".to_string(), 1), None);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shrink_capacity() {
        let mut cache: LruCache<u32, u32> = LruCache::new(4);
        for i in 0..4 {
            cache.insert(i, i);
        }
        cache.set_capacity(2);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains_key(&2));
        assert!(cache.contains_key(&3));
    }

    #[test]
    fn test_text_metrics_measures_once() {
        let mut cache = TextMetricsCache::new(8);
        let mut calls = 0;
        for _ in 0..3 {
            let w = cache.width_with("12px sans", "hello", || {
                calls += 1;
                30.0
            });
            assert_eq!(w, 30.0);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.get("13px sans", "hello"), None);
    }

    #[test]
    fn test_color_cache() {
        let mut cache = ColorCache::new(4);
        assert_eq!(cache.lighten("#000000", 1.0), "#FFFFFF");
        assert_eq!(cache.lighten("#000000", 1.0), "#FFFFFF");
        assert_eq!(cache.len(), 1);
    }
}
