//! # BigMap
//!
//! A hash map that is not limited by the capacity of a single table.
//!
//! `BigMap` keeps an ordered sequence of segments. Each segment is an
//! insertion-ordered hash map capped at a fixed number of entries
//! (`MAX_SEGMENT_SIZE` by default). The map behaves like one unbounded
//! mapping on top of them:
//!
//! - new keys go to the last segment, and a fresh segment is appended when
//!   the last one is full
//! - an existing key is always updated in the segment that already holds it
//! - removing the last entry of a segment drops that segment
//! - after a removal, a segment that became smaller than its successor
//!   swaps places with it (one swap at most)
//! - `len` sums segment sizes in `usize`, `exact_len` in `u128`
//!
//! Lookups scan the segments in order, so they cost O(segment count).
//!
//! ```rust
//! use bigmap::BigMap;
//!
//! let mut map = BigMap::with_segment_capacity(2).unwrap();
//! map.set("a", 1).set("b", 2).set("c", 3);
//!
//! assert_eq!(map.segment_count(), 2);
//! assert_eq!(map.get("b"), Some(&2));
//!
//! assert!(map.delete("c"));
//! assert_eq!(map.segment_count(), 1);
//! assert_eq!(map.exact_len(), 2);
//! ```
//!
//! The map is not synchronised. Iterators borrow it, so the segment
//! sequence cannot be changed while a traversal is in progress.

mod directory;
pub mod entry;
pub mod error;
pub mod iter;
pub mod segment;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod table;

pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use error::{Error, Result};
pub use segment::{Segment, MAX_SEGMENT_SIZE};
pub use table::BigMap;
