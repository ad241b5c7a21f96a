use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash, RandomState},
    ops::Index,
};

use crate::{
    directory::Directory,
    entry::{Entry, OccupiedEntry, VacantEntry},
    error::Result,
    iter::{IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Values, ValuesMut},
    segment::{check_capacity, Segment, MAX_SEGMENT_SIZE},
};

/// A hash map that spreads its entries over a sequence of bounded segments
///
/// No segment ever holds more than the segment capacity (at most
/// `MAX_SEGMENT_SIZE`), so the map grows past the size of any single
/// segment by appending new ones. Lookups scan the segments in order,
/// which costs O(segment count) per operation.
///
/// Iteration visits segments in sequence order and each segment in
/// insertion order. A removal may swap a segment with its successor, so
/// the order across segments is not stable over mutations.
pub struct BigMap<K, V, S = RandomState> {
    pub(crate) directory: Directory<K, V, S>,
}

impl<K, V> BigMap<K, V, RandomState> {
    /// Create an empty `BigMap` with `MAX_SEGMENT_SIZE` segments
    #[inline]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Create an empty `BigMap` whose segments hold at most `capacity` entries
    ///
    /// Fails if `capacity` is zero or above `MAX_SEGMENT_SIZE`.
    #[inline]
    pub fn with_segment_capacity(capacity: usize) -> Result<Self> {
        Self::with_segment_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V> BigMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    /// Create a `BigMap` pre-populated from `entries`, in order.
    ///
    /// Later duplicates overwrite earlier ones.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        entries.into_iter().collect()
    }
}

impl<K, V, S> BigMap<K, V, S> {
    /// Type tag reported in debug output
    pub const TYPE_TAG: &'static str = "BigMap";

    /// Create an empty `BigMap` with provided hasher
    #[inline]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            directory: Directory::new(MAX_SEGMENT_SIZE, hash_builder),
        }
    }

    /// Create an empty `BigMap` with provided segment capacity and hasher
    #[inline]
    pub fn with_segment_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        let capacity = check_capacity(capacity)?;
        Ok(Self {
            directory: Directory::new(capacity, hash_builder),
        })
    }

    /// Returns the number of entries in the map
    ///
    /// The per-segment sum saturates at `usize::MAX`; use [`exact_len`]
    /// when that matters.
    ///
    /// [`exact_len`]: BigMap::exact_len
    #[inline]
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Returns the number of entries in the map, computed without overflow
    #[inline]
    pub fn exact_len(&self) -> u128 {
        self.directory.exact_len()
    }

    /// Returns `true` if the map contains no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Returns a reference to the hasher
    #[inline]
    pub fn hasher(&self) -> &S {
        self.directory.hasher()
    }

    /// Returns the number of segments
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.directory.segment_count()
    }

    /// Returns the capacity of every segment
    #[inline]
    pub fn segment_capacity(&self) -> usize {
        self.directory.segment_capacity()
    }

    /// Returns the segments in sequence order
    #[inline]
    pub fn segments(&self) -> &[Segment<K, V, S>] {
        self.directory.segments()
    }

    /// Returns the entry count of each segment in sequence order
    pub fn segment_lens(&self) -> impl Iterator<Item = usize> + '_ {
        self.directory.segments().iter().map(Segment::len)
    }

    /// Clears the map, dropping every segment
    #[inline]
    pub fn clear(&mut self) {
        self.directory.clear();
    }

    /// An iterator visiting all entries, segment by segment
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter::new(self.directory.segments(), self.len())
    }

    /// An iterator visiting all entries with mutable values
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, S> {
        let len = self.len();
        IterMut::new(self.directory.segments_mut(), len)
    }

    /// An iterator visiting all keys
    pub fn keys(&self) -> Keys<'_, K, V, S> {
        Keys::new(self.iter())
    }

    /// An iterator visiting all values
    pub fn values(&self) -> Values<'_, K, V, S> {
        Values::new(self.iter())
    }

    /// An iterator visiting all values mutably
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V, S> {
        ValuesMut::new(self.iter_mut())
    }

    /// Consumes the map into an iterator over its keys
    pub fn into_keys(self) -> IntoKeys<K, V, S> {
        IntoKeys::new(self.into_iter())
    }

    /// Consumes the map into an iterator over its values
    pub fn into_values(self) -> IntoValues<K, V, S> {
        IntoValues::new(self.into_iter())
    }

    /// Calls `f` on every entry, together with the segment that holds it
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V, &Segment<K, V, S>),
    {
        for segment in self.directory.segments() {
            for (key, value) in segment.iter() {
                f(key, value, segment);
            }
        }
    }
}

impl<K, V, S> BigMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns a reference to the value associated with the given key
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.directory.get(key)
    }

    /// Returns a mutable reference to the value associated with the given key
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.directory.get_mut(key)
    }

    /// Returns the stored key and value for the given key
    #[inline]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.directory.get_key_value(key)
    }

    /// Return `true` if the map contains a value for the given key
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.directory.contains_key(key)
    }

    /// Removes a key from the map, returning the value if the key was present
    ///
    /// If the owning segment becomes empty it is dropped. Otherwise, if the
    /// next segment is strictly larger, the two swap places.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.directory.remove(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value
    #[inline]
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.directory.remove(key)
    }

    /// Removes a key from the map, returning `true` if it was present
    #[inline]
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.directory.remove(key).is_some()
    }

    /// Retains only the entries for which `keep` returns `true`
    ///
    /// Segments left empty are dropped.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.directory.retain(keep);
    }
}

impl<K, V, S> BigMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    /// Inserts a key-value pair into the map
    ///
    /// If the map did not have this key present, `None` is returned and the
    /// entry is appended to the last segment, or to a new segment if the
    /// last one is full.
    /// If the map did have this key present, the value is updated in the
    /// segment that holds it, and the old value is returned.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.directory.insert(key, value)
    }

    /// Inserts a key-value pair and returns the map for chaining
    #[inline]
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        self.directory.insert(key, value);
        self
    }

    /// Gets the given key's entry for in-place manipulation
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        match self.directory.locate(&key) {
            Some((seg_idx, pos)) => Entry::Occupied(OccupiedEntry::new(self, seg_idx, pos)),
            None => Entry::Vacant(VacantEntry::new(self, key)),
        }
    }
}

impl<K, V> Default for BigMap<K, V, RandomState> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Clone for BigMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for BigMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::TYPE_TAG)?;
        f.write_str(" ")?;
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for BigMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.exact_len() == other.exact_len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| *value == *v))
    }
}

impl<K, V, S> Eq for BigMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for BigMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Eq + Hash + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if the key is not present
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in BigMap")
    }
}

impl<K, V, S> FromIterator<(K, V)> for BigMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for BigMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for BigMap<K, V, S>
where
    K: Eq + Hash + Copy,
    V: Copy,
    S: BuildHasher + Clone,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        for (&key, &value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for BigMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    fn from(entries: [(K, V); N]) -> Self {
        Self::from_entries(entries)
    }
}
