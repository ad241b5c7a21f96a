//! Iterators for `BigMap`
//!
//! Every iterator walks the segments in sequence order and each segment in
//! insertion order. The order is fixed per segment when that segment is
//! reached. Iterators borrow the map, so the segment sequence cannot change
//! underneath a traversal.

use std::iter::FusedIterator;

use indexmap::map;

use crate::segment::Segment;
use crate::table::BigMap;

/// An iterator over the entries of a `BigMap`
pub struct Iter<'a, K, V, S> {
    segments: std::slice::Iter<'a, Segment<K, V, S>>,
    current: Option<map::Iter<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V, S> Iter<'a, K, V, S> {
    pub(crate) fn new(segments: &'a [Segment<K, V, S>], len: usize) -> Self {
        Self {
            segments: segments.iter(),
            current: None,
            remaining: len,
        }
    }
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(entry);
            }
            self.current = Some(self.segments.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S> ExactSizeIterator for Iter<'_, K, V, S> {}
impl<K, V, S> FusedIterator for Iter<'_, K, V, S> {}

impl<K, V, S> Clone for Iter<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

/// A mutable iterator over the entries of a `BigMap`
pub struct IterMut<'a, K, V, S> {
    segments: std::slice::IterMut<'a, Segment<K, V, S>>,
    current: Option<map::IterMut<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V, S> IterMut<'a, K, V, S> {
    pub(crate) fn new(segments: &'a mut [Segment<K, V, S>], len: usize) -> Self {
        Self {
            segments: segments.iter_mut(),
            current: None,
            remaining: len,
        }
    }
}

impl<'a, K, V, S> Iterator for IterMut<'a, K, V, S> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(entry);
            }
            self.current = Some(self.segments.next()?.iter_mut());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S> ExactSizeIterator for IterMut<'_, K, V, S> {}
impl<K, V, S> FusedIterator for IterMut<'_, K, V, S> {}

/// An owning iterator over the entries of a `BigMap`
pub struct IntoIter<K, V, S> {
    segments: std::vec::IntoIter<Segment<K, V, S>>,
    current: Option<map::IntoIter<K, V>>,
    remaining: usize,
}

impl<K, V, S> IntoIter<K, V, S> {
    pub(crate) fn new(segments: Vec<Segment<K, V, S>>, len: usize) -> Self {
        Self {
            segments: segments.into_iter(),
            current: None,
            remaining: len,
        }
    }
}

impl<K, V, S> Iterator for IntoIter<K, V, S> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(entry);
            }
            self.current = Some(self.segments.next()?.into_entries());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S> ExactSizeIterator for IntoIter<K, V, S> {}
impl<K, V, S> FusedIterator for IntoIter<K, V, S> {}

/// An iterator over the keys of a `BigMap`
pub struct Keys<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

impl<'a, K, V, S> Keys<'a, K, V, S> {
    pub(crate) fn new(iter: Iter<'a, K, V, S>) -> Self {
        Self { inner: iter }
    }
}

impl<'a, K, V, S> Iterator for Keys<'a, K, V, S> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for Keys<'_, K, V, S> {}
impl<K, V, S> FusedIterator for Keys<'_, K, V, S> {}

/// An iterator over the values of a `BigMap`
pub struct Values<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

impl<'a, K, V, S> Values<'a, K, V, S> {
    pub(crate) fn new(iter: Iter<'a, K, V, S>) -> Self {
        Self { inner: iter }
    }
}

impl<'a, K, V, S> Iterator for Values<'a, K, V, S> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for Values<'_, K, V, S> {}
impl<K, V, S> FusedIterator for Values<'_, K, V, S> {}

/// A mutable iterator over the values of a `BigMap`
pub struct ValuesMut<'a, K, V, S> {
    inner: IterMut<'a, K, V, S>,
}

impl<'a, K, V, S> ValuesMut<'a, K, V, S> {
    pub(crate) fn new(iter: IterMut<'a, K, V, S>) -> Self {
        Self { inner: iter }
    }
}

impl<'a, K, V, S> Iterator for ValuesMut<'a, K, V, S> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for ValuesMut<'_, K, V, S> {}
impl<K, V, S> FusedIterator for ValuesMut<'_, K, V, S> {}

/// An owning iterator over the keys of a `BigMap`
pub struct IntoKeys<K, V, S> {
    inner: IntoIter<K, V, S>,
}

impl<K, V, S> IntoKeys<K, V, S> {
    pub(crate) fn new(iter: IntoIter<K, V, S>) -> Self {
        Self { inner: iter }
    }
}

impl<K, V, S> Iterator for IntoKeys<K, V, S> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for IntoKeys<K, V, S> {}
impl<K, V, S> FusedIterator for IntoKeys<K, V, S> {}

/// An owning iterator over the values of a `BigMap`
pub struct IntoValues<K, V, S> {
    inner: IntoIter<K, V, S>,
}

impl<K, V, S> IntoValues<K, V, S> {
    pub(crate) fn new(iter: IntoIter<K, V, S>) -> Self {
        Self { inner: iter }
    }
}

impl<K, V, S> Iterator for IntoValues<K, V, S> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for IntoValues<K, V, S> {}
impl<K, V, S> FusedIterator for IntoValues<K, V, S> {}

impl<'a, K, V, S> IntoIterator for &'a BigMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut BigMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for BigMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        let len = self.len();
        IntoIter::new(self.directory.into_segments(), len)
    }
}

#[cfg(test)]
mod tests {
    use crate::BigMap;

    fn sample(capacity: usize, n: u64) -> BigMap<u64, u64> {
        let mut map = BigMap::with_segment_capacity(capacity).unwrap();
        for i in 0..n {
            map.insert(i, i * 10);
        }
        map
    }

    #[test]
    fn test_iter_crosses_segments() {
        let map = sample(3, 8);
        assert_eq!(map.segment_count(), 3);

        let entries: Vec<(u64, u64)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u64, u64)> = (0..8).map(|i| (i, i * 10)).collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn test_iter_empty() {
        let map: BigMap<u64, u64> = BigMap::new();
        assert_eq!(map.iter().next(), None);
        assert_eq!(map.iter().len(), 0);
    }

    #[test]
    fn test_exact_size() {
        let map = sample(4, 10);
        let mut iter = map.iter();

        assert_eq!(iter.len(), 10);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 8);
        assert_eq!(iter.by_ref().count(), 8);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_keys_and_values() {
        let map = sample(2, 5);

        let keys: Vec<u64> = map.keys().copied().collect();
        let values: Vec<u64> = map.values().copied().collect();
        assert_eq!(keys, vec![0, 1, 2, 3, 4]);
        assert_eq!(values, vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn test_iter_mut() {
        let mut map = sample(2, 5);

        for (k, v) in map.iter_mut() {
            *v += *k;
        }
        for v in map.values_mut() {
            *v += 1;
        }

        assert_eq!(map.get(&3), Some(&34));
    }

    #[test]
    fn test_into_iter() {
        let map = sample(3, 7);

        let mut iter = map.into_iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next(), Some((0, 0)));
        let rest: Vec<(u64, u64)> = iter.collect();
        assert_eq!(rest.len(), 6);
        assert_eq!(rest.last(), Some(&(6, 60)));
    }

    #[test]
    fn test_into_keys_and_values() {
        let keys: Vec<u64> = sample(2, 4).into_keys().collect();
        let values: Vec<u64> = sample(2, 4).into_values().collect();

        assert_eq!(keys, vec![0, 1, 2, 3]);
        assert_eq!(values, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_order_follows_segment_sequence() {
        let mut map = sample(3, 6);

        // segments [0,1,2] [3,4,5]; removing 1 swaps them
        map.remove(&1);

        let keys: Vec<u64> = map.keys().copied().collect();
        assert_eq!(keys, vec![3, 4, 5, 0, 2]);
    }

    #[test]
    fn test_ref_into_iterator() {
        let mut map = sample(2, 3);

        let mut total = 0;
        for (_, v) in &map {
            total += *v;
        }
        assert_eq!(total, 30);

        for (_, v) in &mut map {
            *v = 1;
        }
        assert!(map.values().all(|v| *v == 1));
    }
}
