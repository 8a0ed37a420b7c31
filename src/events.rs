//! Structural events a `HashTable` reports to its sink.
//!
//! Events borrow from the table and live only for the duration of the
//! `Sink::record` call. They carry plain data; turning them into text is
//! the sink's business (see `render`).

use crate::bucket_array::ChainDescription;

/// Everything that went into placing one key, as computed after the
/// insertion (and any resize it triggered) completed.
#[derive(Debug, PartialEq)]
pub struct InsertionReport<'a, K, V> {
    pub key: &'a K,
    /// Value now stored under `key`.
    pub value: &'a V,
    /// Hash code before spreading.
    pub native_hash: i32,
    /// Spread hash, the one stored in the node.
    pub hash: i32,
    pub capacity: usize,
    /// `capacity - 1`.
    pub mask: usize,
    /// `hash & mask`.
    pub index: usize,
}

impl<'a, K, V> InsertionReport<'a, K, V> {
    pub(crate) fn new(
        key: &'a K,
        value: &'a V,
        native_hash: i32,
        hash: i32,
        capacity: usize,
        index: usize,
    ) -> Self {
        Self {
            key,
            value,
            native_hash,
            hash,
            capacity,
            mask: capacity - 1,
            index,
        }
    }

    /// Two's-complement binary digits of `hash`, no leading zeros.
    pub fn binary_hash(&self) -> String {
        format!("{:b}", self.hash as u32)
    }

    pub fn binary_mask(&self) -> String {
        format!("{:b}", self.mask)
    }
}

#[derive(Debug, PartialEq)]
pub enum Event<'a, K, V> {
    /// A `put` is about to run.
    InsertionStarted { key: &'a K, value: &'a V },
    /// The effective load factor differs from the last one reported.
    LoadFactorObserved { value: f32 },
    /// A resize completed. `non_empty_buckets` counts occupied buckets just
    /// before the rehash.
    ThresholdChanged {
        old_threshold: usize,
        new_threshold: usize,
        non_empty_buckets: usize,
    },
    InsertionComputed(InsertionReport<'a, K, V>),
    /// Full bucket snapshot in index order.
    BucketsDumped {
        buckets: &'a [ChainDescription<'a, K, V>],
    },
}

impl<'a, K, V> Event<'a, K, V> {
    /// Short stable name, handy for filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::InsertionStarted { .. } => "insertion_started",
            Event::LoadFactorObserved { .. } => "load_factor_observed",
            Event::ThresholdChanged { .. } => "threshold_changed",
            Event::InsertionComputed(_) => "insertion_computed",
            Event::BucketsDumped { .. } => "buckets_dumped",
        }
    }
}
