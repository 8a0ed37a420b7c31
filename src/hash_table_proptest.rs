#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can reach the
// bucket layout through `dump_buckets` alongside the public API.

use crate::config::TableConfig;
use crate::error::KeyHashError;
use crate::hash_table::HashTable;
use crate::hasher::{index_for, spread, JavaHash, JavaHashCode, NativeHash};
use crate::sink::{RecordedEvent, Recorder};
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;

// Keys are boxed strings: lookups borrow them as `str`, and `JavaHash`
// reaches their hash code through the `Box` forwarding impl.
type Key = Box<str>;

// Every key lands in the same bucket.
#[derive(Clone, Copy, Default)]
struct ConstHash;
impl<Q: ?Sized> NativeHash<Q> for ConstHash {
    fn native_hash(&self, _key: &Q) -> Result<i32, KeyHashError> {
        Ok(0)
    }
}

#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Contains(String),
    Iterate,
    Dump,
}

fn key_from(pool: &[String], i: usize) -> Key {
    pool[i].as_str().into()
}

fn arb_config() -> impl Strategy<Value = TableConfig> {
    (1usize..=8, proptest::sample::select(vec![0.5f32, 0.75, 1.0, 2.0])).prop_map(|(cap, lf)| {
        TableConfig::default()
            .with_initial_capacity(cap)
            .with_load_factor(lf)
    })
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z0-9]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            1 => idx.clone().prop_map(OpI::Get),
            1 => idx.clone().prop_map(OpI::Remove),
            1 => prop_oneof![contains_pool.prop_map(|s: String| s), "[a-z]{0,5}".prop_map(|s| s)]
                .prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Dump),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<H>(
    config: TableConfig,
    hasher: H,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    H: NativeHash<Key> + NativeHash<str>,
{
    let mut sut: HashTable<Key, i32, H, Recorder<Key, i32>> =
        HashTable::with_parts(config, hasher, Recorder::new()).expect("valid config");
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        let capacity_before = sut.capacity();
        let threshold_before = sut.threshold();
        let mut grew_expected = false;
        sut.sink_mut().take();

        match op {
            OpI::Put(i, v) => {
                let k = key_from(pool, i);
                let is_new = !model.contains_key(&k);
                grew_expected = is_new && model.len() + 1 > threshold_before;
                let prev = sut.put(k.clone(), v).expect("put within max capacity");
                prop_assert_eq!(prev, model.insert(k.clone(), v));
                // get immediately after put returns the written value
                prop_assert_eq!(sut.get(&k).unwrap(), Some(&v));

                let events = sut.sink().events();
                let started = matches!(events.first(), Some(RecordedEvent::InsertionStarted { .. }));
                prop_assert!(started, "first event was {:?}", events.first());
                match events.last() {
                    Some(RecordedEvent::InsertionComputed { key, value, hash, capacity, index, .. }) => {
                        prop_assert_eq!(key, &k);
                        prop_assert_eq!(*value, v);
                        prop_assert_eq!(*capacity, sut.capacity());
                        prop_assert_eq!(*index, index_for(*hash, *capacity));
                    }
                    other => prop_assert!(false, "last event was {:?}", other),
                }
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k).unwrap(), model.get(&k));
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k).unwrap(), model.remove(&k));
                prop_assert!(!sut.contains_key(&k).unwrap());
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str()).unwrap();
                let has_model = model.keys().any(|k| **k == *s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.clone()).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            OpI::Dump => {
                let dump = sut.dump_buckets();
                prop_assert_eq!(dump.len(), sut.capacity());
                let mut seen = BTreeSet::new();
                for chain in &dump {
                    for (pos, node) in chain.nodes.iter().enumerate() {
                        prop_assert_eq!(node.position, pos);
                        prop_assert_eq!(index_for(node.hash, sut.capacity()), chain.index);
                        prop_assert_eq!(model.get(node.key), Some(node.value));
                        // no entry appears twice
                        prop_assert!(seen.insert(node.key.clone()));
                    }
                }
                prop_assert_eq!(seen.len(), model.len());
            }
        }

        // Post-conditions after each op
        let resizes = sut.sink().thresholds().count();
        prop_assert_eq!(resizes, usize::from(grew_expected));
        if grew_expected {
            prop_assert_eq!(sut.capacity(), capacity_before * 2);
        } else {
            prop_assert_eq!(sut.capacity(), capacity_before);
        }
        prop_assert!(sut.capacity().is_power_of_two());
        prop_assert_eq!(
            sut.threshold(),
            (sut.capacity() as f64 * sut.load_factor() as f64).floor() as usize
        );
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Property: state-machine equivalence against a hashbrown model, with
// resize and layout invariants checked after every operation:
// - put returns the previous value; get right after put sees the new value.
// - a resize happens iff a new key pushes len past the old threshold, and
//   doubles capacity; threshold tracks floor(capacity * load_factor).
// - every dumped node sits at `hash & (capacity - 1)`; no entry is lost or
//   duplicated across resizes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(config in arb_config(), (pool, ops) in arb_scenario()) {
        run_scenario(config, JavaHash, &pool, ops)?;
    }

    // Same invariants with every key colliding into one chain.
    #[test]
    fn prop_state_machine_with_collisions(config in arb_config(), (pool, ops) in arb_scenario()) {
        run_scenario(config, ConstHash, &pool, ops)?;
    }

    // Stored hashes are the spread native hash codes.
    #[test]
    fn prop_stored_hash_is_spread(keys in proptest::collection::vec(".{0,8}", 1..40)) {
        let mut t: HashTable<String, usize> = HashTable::new();
        for (i, k) in keys.iter().enumerate() {
            t.put(k.clone(), i).unwrap();
        }
        for chain in t.dump_buckets() {
            for node in chain.nodes {
                prop_assert_eq!(node.hash, spread(node.key.java_hash_code()));
            }
        }
    }
}
