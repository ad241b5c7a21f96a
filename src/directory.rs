use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
};

use tracing::trace;

use crate::segment::Segment;

/// Ordered sequence of segments backing a `BigMap`.
///
/// Invariants kept here:
/// - a key lives in at most one segment
/// - no segment holds more than `segment_capacity` entries
/// - a new segment is appended only when the last one is missing or full
/// - no segment is left empty after an operation returns
#[derive(Clone)]
pub struct Directory<K, V, S> {
    /// Segment storage, oldest first (modulo swaps after removals)
    segments: Vec<Segment<K, V, S>>,

    /// Capacity given to every new segment
    segment_capacity: usize,

    /// Hasher cloned into every new segment
    hash_builder: S,
}

impl<K, V, S> Directory<K, V, S> {
    /// Create an empty directory. `segment_capacity` must already be validated.
    pub fn new(segment_capacity: usize, hash_builder: S) -> Self {
        Self {
            segments: Vec::new(),
            segment_capacity,
            hash_builder,
        }
    }

    /// Number of entries, summed in the native word.
    ///
    /// Saturates at `usize::MAX` rather than wrapping.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments
            .iter()
            .fold(0usize, |total, seg| total.saturating_add(seg.len()))
    }

    /// Number of entries, summed in a 128-bit domain
    #[inline]
    pub fn exact_len(&self) -> u128 {
        self.segments.iter().map(|seg| seg.len() as u128).sum()
    }

    /// Check if directory is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Capacity of every segment
    #[inline]
    pub fn segment_capacity(&self) -> usize {
        self.segment_capacity
    }

    /// Segments in sequence order
    #[inline]
    pub fn segments(&self) -> &[Segment<K, V, S>] {
        &self.segments
    }

    #[inline]
    pub fn segments_mut(&mut self) -> &mut [Segment<K, V, S>] {
        &mut self.segments
    }

    #[inline]
    pub fn into_segments(self) -> Vec<Segment<K, V, S>> {
        self.segments
    }

    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Drop every segment
    pub fn clear(&mut self) {
        trace!(segments = self.segments.len(), "clearing all segments");
        self.segments.clear();
    }

    /// Restore the segment invariants after one entry left segment `idx`.
    ///
    /// An emptied segment is dropped. Otherwise, if the next segment is
    /// strictly larger, the two trade places. Nothing else moves.
    fn settle(&mut self, idx: usize) {
        let len = self.segments[idx].len();

        if len == 0 {
            self.segments.remove(idx);
            trace!(
                segment = idx,
                remaining = self.segments.len(),
                "removed empty segment"
            );
            return;
        }

        if let Some(next_len) = self.segments.get(idx + 1).map(Segment::len) {
            if next_len > len {
                self.segments.swap(idx, idx + 1);
                trace!(
                    segment = idx,
                    len,
                    next_len,
                    "swapped segment with larger successor"
                );
            }
        }
    }
}

impl<K, V, S> Directory<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Find the owning segment index and in-segment position of `key`
    pub fn locate<Q>(&self, key: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.segments
            .iter()
            .enumerate()
            .find_map(|(seg_idx, seg)| seg.get_index_of(key).map(|pos| (seg_idx, pos)))
    }

    /// Check if key exists
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.segments.iter().any(|seg| seg.contains_key(key))
    }

    /// Get value by key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.segments.iter().find_map(|seg| seg.get(key))
    }

    /// Get mutable value
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.segments.iter_mut().find_map(|seg| seg.get_mut(key))
    }

    /// Get key-value pair
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.segments.iter().find_map(|seg| seg.get_key_value(key))
    }

    /// Remove entry, returning it if the key was present
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        for idx in 0..self.segments.len() {
            if let Some(entry) = self.segments[idx].remove(key) {
                self.settle(idx);
                return Some(entry);
            }
        }

        None
    }

    /// Remove the entry at a position previously returned by `locate`
    pub fn remove_at(&mut self, seg_idx: usize, pos: usize) -> Option<(K, V)> {
        let entry = self.segments.get_mut(seg_idx)?.remove_index(pos)?;
        self.settle(seg_idx);
        Some(entry)
    }

    /// Keep only the entries for which `keep` returns `true`.
    ///
    /// Segments left empty are dropped; surviving segments keep their order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        for seg in self.segments.iter_mut() {
            seg.retain(&mut keep);
        }

        let before = self.segments.len();
        self.segments.retain(|seg| !seg.is_empty());
        if self.segments.len() != before {
            trace!(
                removed = before - self.segments.len(),
                remaining = self.segments.len(),
                "removed segments emptied by retain"
            );
        }
    }
}

impl<K, V, S> Directory<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Clone,
{
    /// Append a fresh segment and return its index
    fn push_segment(&mut self) -> usize {
        let idx = self.segments.len();
        self.segments.push(Segment::with_hasher(
            self.segment_capacity,
            self.hash_builder.clone(),
        ));
        trace!(
            segment = idx,
            capacity = self.segment_capacity,
            "appended segment"
        );
        idx
    }

    /// Insert a key known to be absent from every segment.
    ///
    /// The entry goes to the last segment, or to a new one when the last
    /// segment is missing or full. Returns `(segment index, position)`.
    pub fn insert_new(&mut self, key: K, value: V) -> (usize, usize) {
        let mut key = key;
        let mut value = value;

        loop {
            if let Some(tail) = self.segments.last_mut() {
                match tail.insert_new(key, value) {
                    Ok(pos) => return (self.segments.len() - 1, pos),
                    Err((k, v)) => {
                        key = k;
                        value = v;
                    }
                }
            }

            self.push_segment();
        }
    }

    /// Insert key-value pair
    ///
    /// An existing key is updated in the segment that owns it and the old
    /// value is returned. A new key is appended by `insert_new`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }

        self.insert_new(key, value);
        None
    }
}
