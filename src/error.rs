//! Error types for `BigMap` configuration.

use thiserror::Error;

/// Result type for fallible `BigMap` constructors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring a `BigMap`.
///
/// Map operations themselves never fail: a missing key is reported through
/// `Option` or `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A segment must be able to hold at least one entry.
    #[error("segment capacity must be at least 1")]
    ZeroSegmentCapacity,

    /// The requested segment capacity is above the per-segment ceiling.
    #[error("segment capacity {requested} exceeds the maximum of {max}")]
    SegmentCapacityTooLarge {
        /// The capacity that was asked for.
        requested: usize,
        /// The largest capacity a segment may have.
        max: usize,
    },
}
