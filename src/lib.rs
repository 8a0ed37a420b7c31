//! traced-hashmap: a single-threaded, separately-chained hash table that
//! reports its own mechanics (bucket indexing, collision chains, growth)
//! as structured events while behaving like an ordinary map.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: make every structural decision of a chained hash table
//!   observable without changing its put/get contract.
//! - Layers:
//!   - hasher: native 32-bit hash codes (`NativeHash`), the `spread`
//!     step `h ^ (h >>> 16)`, and `index_for` masking.
//!   - bucket_array: power-of-two array of owned singly-linked chains;
//!     iterative traversal, tail append, ordered drain for rehashing.
//!   - HashTable<K, V, H, O>: put/get/remove plus the growth policy;
//!     emits `Event`s to an injected `Sink`.
//!   - sink/render: stock sinks (`NullSink`, `LogSink`, `WriterSink`,
//!     `Recorder`) and text rendering, both outside the core.
//!
//! Growth policy
//! - Capacity starts at a power of two (default 16) and doubles.
//! - `threshold == floor(capacity * load_factor)` after every change.
//! - A resize runs exactly when inserting a new key makes
//!   `len() > threshold()`; overwriting never resizes.
//! - Rehashing walks buckets in index order and chains head to tail,
//!   appending to the new chains, so per-chain insertion order survives.
//! - Growth past `max_capacity` is refused before the new node is linked;
//!   the table is left exactly as it was.
//!
//! Events
//! - `put` emits, in order: `InsertionStarted`, `LoadFactorObserved`
//!   (only when it differs from the last reported value, which starts at
//!   the default 0.75), `ThresholdChanged` (only on resize),
//!   `InsertionComputed` (always, with post-resize capacity and index).
//! - `log_buckets` emits `BucketsDumped`; `dump_buckets` returns the same
//!   snapshot without emitting.
//! - Sinks are one-way: a failing sink is logged with `log::warn!` and
//!   ignored; it never affects table state.
//!
//! Notes and non-goals
//! - Single-threaded; the debug reentrancy guard panics if key equality,
//!   the hash strategy or a sink re-enters the table mid-operation.
//! - No shrinking on `remove`, no treeified chains, no iteration order
//!   guarantees beyond "bucket order, then chain order".
//! - Absent keys (`Option::None` under `JavaHash`) hash to 0 and live in
//!   bucket 0.

mod bucket_array;
pub mod config;
mod error;
pub mod events;
mod hash_table;
mod hash_table_proptest;
pub mod hasher;
mod reentrancy;
mod render;
pub mod sink;

// Public surface
pub use bucket_array::{ChainDescription, NodeView};
pub use config::TableConfig;
pub use error::{ConfigError, KeyHashError, SinkError, TableError};
pub use events::{Event, InsertionReport};
pub use hash_table::{HashTable, Iter};
pub use hasher::{spread, index_for, FnHash, JavaHash, JavaHashCode, NativeHash, StdHash};
pub use sink::{LogSink, NullSink, RecordedEvent, Recorder, Sink, WriterSink};
