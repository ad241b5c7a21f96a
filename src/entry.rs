//! Entry API for `BigMap`

use std::hash::{BuildHasher, Hash};

use crate::table::BigMap;

/// A view into a single entry in a `BigMap`, which may either be vacant or occupied
pub enum Entry<'a, K, V, S> {
    Occupied(OccupiedEntry<'a, K, V, S>),
    Vacant(VacantEntry<'a, K, V, S>),
}

/// A view into an occupied entry in a `BigMap`
///
/// Holds the owning segment index and the position inside that segment.
pub struct OccupiedEntry<'a, K, V, S> {
    map: &'a mut BigMap<K, V, S>,
    seg_idx: usize,
    pos: usize,
}

/// A view into a vacant entry in a `BigMap`
pub struct VacantEntry<'a, K, V, S> {
    map: &'a mut BigMap<K, V, S>,
    key: K,
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    /// Returns a reference to this entry's key
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }

    /// Ensures a value is in the entry by inserting the default if empty,
    /// and returns a mutable reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the
    /// default function if empty, and returns a mutable reference to
    /// the value in the entry
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the
    /// default function if empty
    /// The key is passed to the function
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = default(entry.key());
                entry.insert(value)
            }
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts into the map
    pub fn and_modify<F: FnOnce(&mut V)>(mut self, f: F) -> Self {
        if let Entry::Occupied(entry) = &mut self {
            f(entry.get_mut());
        }
        self
    }
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    K: Eq + Hash,
    V: Default,
    S: BuildHasher + Clone,
{
    /// Ensures a value is in the entry by inserting the default value if empty,
    /// and returns a mutable reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

impl<'a, K, V, S> OccupiedEntry<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a mut BigMap<K, V, S>, seg_idx: usize, pos: usize) -> Self {
        Self { map, seg_idx, pos }
    }

    /// Index of the segment holding this entry
    pub fn segment_index(&self) -> usize {
        self.seg_idx
    }

    /// Gets a reference to the key in the entry
    pub fn key(&self) -> &K {
        self.map.directory.segments()[self.seg_idx]
            .get_index(self.pos)
            .map(|(k, _)| k)
            .expect("OccupiedEntry: position not found")
    }

    /// Gets a reference to the value in the entry
    pub fn get(&self) -> &V {
        self.map.directory.segments()[self.seg_idx]
            .get_index(self.pos)
            .map(|(_, v)| v)
            .expect("OccupiedEntry: position not found")
    }

    /// Gets a mutable reference to the value in the entry
    pub fn get_mut(&mut self) -> &mut V {
        self.map.directory.segments_mut()[self.seg_idx]
            .get_index_mut(self.pos)
            .map(|(_, v)| v)
            .expect("OccupiedEntry: position not found")
    }

    /// Converts the entry into a mutable reference to its value
    pub fn into_mut(self) -> &'a mut V {
        let map = self.map;
        map.directory.segments_mut()[self.seg_idx]
            .get_index_mut(self.pos)
            .map(|(_, v)| v)
            .expect("OccupiedEntry: position not found")
    }

    /// Sets the value of the entry, and returns the entry's old value
    pub fn insert(&mut self, value: V) -> V {
        std::mem::replace(self.get_mut(), value)
    }

    /// Takes the value out of the entry, and returns it
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Takes the key and value out of the entry
    ///
    /// Follows the same segment bookkeeping as `BigMap::remove`.
    pub fn remove_entry(self) -> (K, V) {
        self.map
            .directory
            .remove_at(self.seg_idx, self.pos)
            .expect("OccupiedEntry: position not found")
    }
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    pub(crate) fn new(map: &'a mut BigMap<K, V, S>, key: K) -> Self {
        Self { map, key }
    }

    /// Gets a reference to the key that would be used when inserting
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key
    pub fn into_key(self) -> K {
        self.key
    }

    /// Sets the value of the entry, and returns a mutable reference to it
    ///
    /// The entry is appended to the last segment, or to a new one if the
    /// last segment is full.
    pub fn insert(self, value: V) -> &'a mut V {
        let map = self.map;
        let (seg_idx, pos) = map.directory.insert_new(self.key, value);

        map.directory.segments_mut()[seg_idx]
            .get_index_mut(pos)
            .map(|(_, v)| v)
            .expect("VacantEntry::insert: failed to find inserted entry")
    }
}

#[cfg(test)]
mod tests {
    use crate::BigMap;

    use super::Entry;

    fn sample(capacity: usize, n: u64) -> BigMap<u64, u64> {
        let mut map = BigMap::with_segment_capacity(capacity).unwrap();
        for i in 0..n {
            map.insert(i, i);
        }
        map
    }

    #[test]
    fn test_or_insert() {
        let mut map = sample(2, 3);

        *map.entry(0).or_insert(50) += 1;
        *map.entry(9).or_insert(50) += 1;

        assert_eq!(map.get(&0), Some(&1));
        assert_eq!(map.get(&9), Some(&51));
        assert_eq!(map.segment_lens().collect::<Vec<_>>(), vec![2, 2]);
    }

    #[test]
    fn test_vacant_insert_opens_segment() {
        let mut map = sample(2, 2);

        map.entry(7).or_insert_with(|| 70);
        assert_eq!(map.segment_count(), 2);
        assert_eq!(map.get(&7), Some(&70));
    }

    #[test]
    fn test_or_insert_with_key() {
        let mut map: BigMap<u64, u64> = BigMap::new();

        map.entry(4).or_insert_with_key(|k| k * 100);
        assert_eq!(map.get(&4), Some(&400));
    }

    #[test]
    fn test_or_default_and_modify() {
        let mut map: BigMap<&str, u32> = BigMap::new();

        map.entry("a").and_modify(|v| *v += 1).or_default();
        map.entry("a").and_modify(|v| *v += 1).or_default();

        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn test_occupied_entry() {
        let mut map = sample(3, 6);

        match map.entry(4) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &4);
                assert_eq!(entry.get(), &4);
                assert_eq!(entry.segment_index(), 1);
                assert_eq!(entry.insert(40), 4);
                assert_eq!(entry.get(), &40);
            }
            Entry::Vacant(_) => panic!("key 4 should be present"),
        }
        assert_eq!(map.get(&4), Some(&40));
    }

    #[test]
    fn test_occupied_remove_settles_segments() {
        let mut map = sample(3, 6);

        match map.entry(1) {
            Entry::Occupied(entry) => assert_eq!(entry.remove(), 1),
            Entry::Vacant(_) => panic!("key 1 should be present"),
        }

        // first segment shrank below its successor, so they swapped
        assert_eq!(map.segment_lens().collect::<Vec<_>>(), vec![3, 2]);
        assert!(!map.contains_key(&1));
    }

    #[test]
    fn test_occupied_remove_entry_drops_empty_segment() {
        let mut map = sample(2, 3);

        if let Entry::Occupied(entry) = map.entry(2) {
            assert_eq!(entry.remove_entry(), (2, 2));
        }
        assert_eq!(map.segment_count(), 1);
    }

    #[test]
    fn test_vacant_entry() {
        let mut map = sample(2, 1);

        match map.entry(5) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &5);
                *entry.insert(55) += 1;
            }
            Entry::Occupied(_) => panic!("key 5 should be absent"),
        }
        assert_eq!(map.get(&5), Some(&56));

        if let Entry::Vacant(entry) = map.entry(6) {
            assert_eq!(entry.into_key(), 6);
        }
        assert!(!map.contains_key(&6));
    }
}
