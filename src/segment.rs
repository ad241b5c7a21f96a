//! Segment is a capacity-bounded hash map that remembers insertion order.
//!
//! - Backed by `indexmap::IndexMap`, so iteration follows insertion order
//! - Holds at most `capacity` entries, and `capacity <= MAX_SEGMENT_SIZE`
//! - Removal shifts later entries down so the remaining order is unchanged
//! - Knows nothing about its neighbours; the directory owns placement

use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
};

use indexmap::{map, IndexMap};

use crate::error::{Error, Result};

/// Largest number of entries a single segment may hold
pub const MAX_SEGMENT_SIZE: usize = 1 << 24;

/// Validate a requested per-segment capacity
pub(crate) fn check_capacity(capacity: usize) -> Result<usize> {
    match capacity {
        0 => Err(Error::ZeroSegmentCapacity),
        c if c > MAX_SEGMENT_SIZE => Err(Error::SegmentCapacityTooLarge {
            requested: c,
            max: MAX_SEGMENT_SIZE,
        }),
        c => Ok(c),
    }
}

/// One shard of a `BigMap`: an insertion-ordered map with a hard entry ceiling
#[derive(Clone)]
pub struct Segment<K, V, S> {
    /// Entries in insertion order
    entries: IndexMap<K, V, S>,

    /// Maximum number of entries
    capacity: usize,
}

impl<K, V, S> Segment<K, V, S> {
    /// Create an empty segment with the given capacity and hasher
    pub(crate) fn with_hasher(capacity: usize, hash_builder: S) -> Self {
        debug_assert!(capacity > 0 && capacity <= MAX_SEGMENT_SIZE);
        Self {
            entries: IndexMap::with_hasher(hash_builder),
            capacity,
        }
    }

    /// Get entry count
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if segment is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries this segment accepts
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if segment is full
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> map::Iter<'_, K, V> {
        self.entries.iter()
    }

    /// Iterate over keys in insertion order
    pub fn keys(&self) -> map::Keys<'_, K, V> {
        self.entries.keys()
    }

    /// Iterate over values in insertion order
    pub fn values(&self) -> map::Values<'_, K, V> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> map::IterMut<'_, K, V> {
        self.entries.iter_mut()
    }

    pub(crate) fn into_entries(self) -> map::IntoIter<K, V> {
        self.entries.into_iter()
    }

    /// Entry at `index` in insertion order
    #[inline]
    pub(crate) fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get_index(index)
    }

    /// Mutable entry at `index` in insertion order
    #[inline]
    pub(crate) fn get_index_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        self.entries.get_index_mut(index)
    }
}

impl<K, V, S> Segment<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Check if key exists
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Get reference to value by key
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Get key-value pair references
    #[inline]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_key_value(key)
    }

    /// Get mutable reference to value by key
    #[inline]
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key)
    }

    /// Position of `key` in insertion order
    #[inline]
    pub(crate) fn get_index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_index_of(key)
    }

    /// Append a new entry.
    ///
    /// Returns `Ok(index)` with the entry's position on success.
    /// Returns `Err((key, value))` if the segment is full.
    ///
    /// Note: This does NOT check other segments for the key. The caller
    /// must already know the key is absent everywhere.
    pub(crate) fn insert_new(&mut self, key: K, value: V) -> std::result::Result<usize, (K, V)> {
        if self.is_full() {
            return Err((key, value));
        }

        let (index, previous) = self.entries.insert_full(key, value);
        debug_assert!(previous.is_none(), "insert_new called with a present key");
        Ok(index)
    }

    /// Remove entry by key, keeping the order of the rest
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.shift_remove_entry(key)
    }

    /// Remove entry at `index`, keeping the order of the rest
    pub(crate) fn remove_index(&mut self, index: usize) -> Option<(K, V)> {
        self.entries.shift_remove_index(index)
    }

    /// Keep only the entries for which `keep` returns `true`
    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.entries.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::RandomState;

    fn segment(capacity: usize) -> Segment<u64, u64, RandomState> {
        Segment::with_hasher(capacity, RandomState::new())
    }

    #[test]
    fn test_new_segment() {
        let seg = segment(4);
        assert!(seg.is_empty());
        assert!(!seg.is_full());
        assert_eq!(seg.capacity(), 4);
        assert_eq!(seg.len(), 0);
    }

    #[test]
    fn test_check_capacity() {
        assert_eq!(check_capacity(0), Err(Error::ZeroSegmentCapacity));
        assert_eq!(check_capacity(1), Ok(1));
        assert_eq!(check_capacity(MAX_SEGMENT_SIZE), Ok(MAX_SEGMENT_SIZE));
        assert_eq!(
            check_capacity(MAX_SEGMENT_SIZE + 1),
            Err(Error::SegmentCapacityTooLarge {
                requested: MAX_SEGMENT_SIZE + 1,
                max: MAX_SEGMENT_SIZE,
            })
        );
    }

    #[test]
    fn test_insert_and_get() {
        let mut seg = segment(4);

        assert_eq!(seg.insert_new(1, 10), Ok(0));
        assert_eq!(seg.insert_new(2, 20), Ok(1));

        assert_eq!(seg.get(&1), Some(&10));
        assert_eq!(seg.get_key_value(&2), Some((&2, &20)));
        assert!(seg.contains_key(&2));
        assert!(!seg.contains_key(&3));
        assert_eq!(seg.get_index_of(&2), Some(1));
    }

    #[test]
    fn test_insert_when_full() {
        let mut seg = segment(2);

        seg.insert_new(1, 10).unwrap();
        seg.insert_new(2, 20).unwrap();
        assert!(seg.is_full());

        assert_eq!(seg.insert_new(3, 30), Err((3, 30)));
        assert_eq!(seg.len(), 2);
        assert!(!seg.contains_key(&3));
    }

    #[test]
    fn test_get_mut() {
        let mut seg = segment(4);
        seg.insert_new(1, 10).unwrap();

        *seg.get_mut(&1).unwrap() = 99;
        assert_eq!(seg.get(&1), Some(&99));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut seg = segment(8);
        for i in 0u64..5 {
            seg.insert_new(i, i * 10).unwrap();
        }

        assert_eq!(seg.remove(&2), Some((2, 20)));
        assert_eq!(seg.remove(&2), None);

        let keys: Vec<u64> = seg.keys().copied().collect();
        assert_eq!(keys, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_remove_index() {
        let mut seg = segment(4);
        seg.insert_new(7, 70).unwrap();
        seg.insert_new(8, 80).unwrap();

        assert_eq!(seg.remove_index(0), Some((7, 70)));
        assert_eq!(seg.remove_index(5), None);
        assert_eq!(seg.get_index(0), Some((&8, &80)));
    }

    #[test]
    fn test_iter_insertion_order() {
        let mut seg = segment(8);
        for k in [5u64, 1, 9, 3] {
            seg.insert_new(k, k + 100).unwrap();
        }

        let entries: Vec<(u64, u64)> = seg.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(entries, vec![(5, 105), (1, 101), (9, 109), (3, 103)]);

        let values: Vec<u64> = seg.values().copied().collect();
        assert_eq!(values, vec![105, 101, 109, 103]);
    }

    #[test]
    fn test_retain() {
        let mut seg = segment(8);
        for i in 0u64..6 {
            seg.insert_new(i, i).unwrap();
        }

        seg.retain(|k, _| k % 2 == 0);
        let keys: Vec<u64> = seg.keys().copied().collect();
        assert_eq!(keys, vec![0, 2, 4]);
    }

    #[test]
    fn test_string_keys_borrow() {
        let mut seg: Segment<String, u32, RandomState> = Segment::with_hasher(4, RandomState::new());
        seg.insert_new("hello".to_string(), 1).unwrap();

        assert_eq!(seg.get("hello"), Some(&1));
        assert_eq!(seg.remove("hello"), Some(("hello".to_string(), 1)));
    }
}
