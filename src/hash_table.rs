//! HashTable: chained hashing with power-of-two buckets, growth by doubling,
//! and structural events for every insertion and resize.

use crate::bucket_array::{BucketArray, Chain, ChainDescription, Node};
use crate::config::{threshold_for, TableConfig};
use crate::error::{ConfigError, TableError};
use crate::events::{Event, InsertionReport};
use crate::hasher::{index_for, spread, JavaHash, NativeHash};
use crate::reentrancy::DebugReentrancy;
use crate::sink::{NullSink, Sink};
use core::borrow::Borrow;
use log::{trace, warn};

/// Bucket storage plus the scalars the resize policy depends on.
struct Storage<K, V> {
    buckets: BucketArray<K, V>,
    size: usize,
    load_factor: f32,
    threshold: usize,
    max_capacity: usize,
}

/// Outcome of one doubling, reported as `ThresholdChanged`.
#[derive(Debug, Clone, Copy)]
struct Resized {
    old_threshold: usize,
    new_threshold: usize,
    non_empty_buckets: usize,
}

impl<K, V> Storage<K, V> {
    fn new(config: &TableConfig) -> Self {
        let capacity = config.table_capacity();
        Self {
            buckets: BucketArray::with_capacity(capacity),
            size: 0,
            load_factor: config.load_factor,
            threshold: threshold_for(capacity, config.load_factor),
            max_capacity: config.max_capacity,
        }
    }

    fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    fn grown_capacity(&self) -> Result<usize, TableError> {
        let capacity = self.capacity();
        match capacity.checked_mul(2) {
            Some(next) if next <= self.max_capacity => Ok(next),
            _ => Err(TableError::CapacityOverflow {
                capacity,
                max_capacity: self.max_capacity,
            }),
        }
    }

    /// Doubles the bucket count and relinks every node. Either the whole
    /// rehash happens or, on overflow, nothing is touched.
    fn resize(&mut self) -> Result<Resized, TableError> {
        let new_capacity = self.grown_capacity()?;
        let non_empty_buckets = self.buckets.non_empty();
        let mut next = BucketArray::with_capacity(new_capacity);
        for node in self.buckets.drain() {
            let index = index_for(node.hash, new_capacity);
            next.push_back(index, node);
        }
        self.buckets = next;

        let old_threshold = self.threshold;
        self.threshold = threshold_for(new_capacity, self.load_factor);
        trace!(
            "resized to {} buckets: threshold {} -> {}, {} buckets were occupied",
            new_capacity,
            old_threshold,
            self.threshold,
            non_empty_buckets
        );
        Ok(Resized {
            old_threshold,
            new_threshold: self.threshold,
            non_empty_buckets,
        })
    }
}

/// A key-value table that reports its internals to a `Sink`.
///
/// `H` computes native hash codes (see `hasher`); `O` receives events.
pub struct HashTable<K, V, H = JavaHash, O = NullSink> {
    storage: Storage<K, V>,
    hasher: H,
    sink: O,
    // Load factor most recently reported; starts at the default so that only
    // a non-default table announces its load factor.
    observed_load_factor: f32,
    reentrancy: DebugReentrancy,
}

impl<K, V> HashTable<K, V> {
    /// 16 buckets, load factor 0.75, no sink.
    pub fn new() -> Self {
        Self::from_parts(TableConfig::default(), JavaHash, NullSink)
    }

    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        Self::with_parts(config, JavaHash, NullSink)
    }
}

impl<K, V> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, O> HashTable<K, V, JavaHash, O> {
    pub fn with_sink(config: TableConfig, sink: O) -> Result<Self, ConfigError> {
        Self::with_parts(config, JavaHash, sink)
    }
}

impl<K, V, H, O> HashTable<K, V, H, O> {
    pub fn with_parts(config: TableConfig, hasher: H, sink: O) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(config, hasher, sink))
    }

    fn from_parts(config: TableConfig, hasher: H, sink: O) -> Self {
        Self {
            storage: Storage::new(&config),
            hasher,
            sink,
            observed_load_factor: crate::config::DEFAULT_LOAD_FACTOR,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.size
    }

    pub fn is_empty(&self) -> bool {
        self.storage.size == 0
    }

    /// Current bucket count, always a power of two.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Size above which the next new key triggers a resize.
    pub fn threshold(&self) -> usize {
        self.storage.threshold
    }

    pub fn load_factor(&self) -> f32 {
        self.storage.load_factor
    }

    pub fn max_capacity(&self) -> usize {
        self.storage.max_capacity
    }

    pub fn non_empty_buckets(&self) -> usize {
        self.storage.buckets.non_empty()
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn sink(&self) -> &O {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut O {
        &mut self.sink
    }

    pub fn into_sink(self) -> O {
        self.sink
    }

    /// Entries in bucket order, each chain head to tail.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: &self.storage.buckets,
            next_index: 0,
            chain: None,
        }
    }

    /// Snapshot of every bucket in index order; empty buckets included.
    pub fn dump_buckets(&self) -> Vec<ChainDescription<'_, K, V>> {
        let _g = self.reentrancy.enter("dump_buckets");
        self.storage.buckets.describe()
    }
}

impl<K, V, H, O> HashTable<K, V, H, O>
where
    K: Eq,
    H: NativeHash<K>,
    O: Sink<K, V>,
{
    /// Inserts or overwrites `key`, returning the value it replaced.
    ///
    /// A new key that pushes `len()` past `threshold()` doubles the table
    /// before this returns. Events go out in order: `InsertionStarted`,
    /// `LoadFactorObserved` (if changed), `ThresholdChanged` (if resized),
    /// `InsertionComputed`.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let _g = self.reentrancy.enter("put");
        deliver(
            &mut self.sink,
            &Event::InsertionStarted {
                key: &key,
                value: &value,
            },
        );

        let native_hash = self.hasher.native_hash(&key)?;
        let hash = spread(native_hash);
        let capacity = self.storage.capacity();
        let index = index_for(hash, capacity);

        if let Some(node) = self.storage.buckets.find_mut(index, hash, &key) {
            let previous = core::mem::replace(&mut node.value, value);
            observe_load_factor::<K, V, O>(
                &mut self.sink,
                &mut self.observed_load_factor,
                self.storage.load_factor,
            );
            let report =
                InsertionReport::new(&node.key, &node.value, native_hash, hash, capacity, index);
            deliver(&mut self.sink, &Event::InsertionComputed(report));
            return Ok(Some(previous));
        }

        if self.storage.size + 1 > self.storage.threshold {
            // Refuse before linking so an overflow leaves no trace.
            self.storage.grown_capacity()?;
        }
        self.storage
            .buckets
            .push_back(index, Node::new(key, value, hash));
        self.storage.size += 1;
        let resized = if self.storage.size > self.storage.threshold {
            Some(self.storage.resize()?)
        } else {
            None
        };

        observe_load_factor::<K, V, O>(
            &mut self.sink,
            &mut self.observed_load_factor,
            self.storage.load_factor,
        );
        if let Some(r) = resized {
            deliver(
                &mut self.sink,
                &Event::ThresholdChanged {
                    old_threshold: r.old_threshold,
                    new_threshold: r.new_threshold,
                    non_empty_buckets: r.non_empty_buckets,
                },
            );
        }

        let capacity = self.storage.capacity();
        let index = index_for(hash, capacity);
        // A freshly linked key is always the tail of its chain, before and
        // after a rehash, since relinking preserves chain order.
        if let Some(node) = self.storage.buckets.tail(index) {
            let report =
                InsertionReport::new(&node.key, &node.value, native_hash, hash, capacity, index);
            deliver(&mut self.sink, &Event::InsertionComputed(report));
        }
        Ok(None)
    }

    pub fn get<Q>(&self, key: &Q) -> Result<Option<&V>, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: NativeHash<Q>,
    {
        let _g = self.reentrancy.enter("get");
        let hash = spread(self.hasher.native_hash(key)?);
        let index = index_for(hash, self.storage.capacity());
        Ok(self
            .storage
            .buckets
            .find(index, hash, key)
            .map(|n| &n.value))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: NativeHash<Q>,
    {
        Ok(self.get(key)?.is_some())
    }

    /// Unlinks `key` and returns its value. The table never shrinks.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Option<V>, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: NativeHash<Q>,
    {
        let _g = self.reentrancy.enter("remove");
        let hash = spread(self.hasher.native_hash(key)?);
        let index = index_for(hash, self.storage.capacity());
        let Some(node) = self.storage.buckets.unlink(index, hash, key) else {
            return Ok(None);
        };
        self.storage.size -= 1;
        trace!("removed entry from bucket {index}, {} left", self.storage.size);
        Ok(Some(node.value))
    }

    /// Sends the current `dump_buckets` snapshot to the sink.
    pub fn log_buckets(&mut self) {
        let _g = self.reentrancy.enter("log_buckets");
        let buckets = self.storage.buckets.describe();
        deliver(&mut self.sink, &Event::BucketsDumped { buckets: &buckets });
    }
}

fn deliver<K, V, O: Sink<K, V>>(sink: &mut O, event: &Event<'_, K, V>) {
    if let Err(err) = sink.record(event) {
        warn!("sink dropped {} event: {}", event.kind(), err);
    }
}

/// Reports `current` if it differs from the last value the sink saw.
fn observe_load_factor<K, V, O: Sink<K, V>>(sink: &mut O, observed: &mut f32, current: f32) {
    if *observed != current {
        *observed = current;
        deliver(sink, &Event::LoadFactorObserved { value: current });
    }
}

/// Iterator returned by `HashTable::iter`.
pub struct Iter<'a, K, V> {
    buckets: &'a BucketArray<K, V>,
    next_index: usize,
    chain: Option<Chain<'a, K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.chain.as_mut().and_then(Iterator::next) {
                return Some((&node.key, &node.value));
            }
            if self.next_index >= self.buckets.capacity() {
                return None;
            }
            self.chain = Some(self.buckets.chain(self.next_index));
            self.next_index += 1;
        }
    }
}
