//! Text rendering for events and bucket snapshots.
//!
//! The table itself never formats anything; these impls exist for sinks
//! that print. Layout follows the classic walk-through output:
//!
//! ```text
//! bucket[0] Node[0] { KEY: 0 VALUE: 0 HASH: 48 } ---> Node[1] { KEY: 11 VALUE: 11 HASH: 1568 } ---> NULL
//! bucket[1] NULL
//! ```

use crate::bucket_array::{ChainDescription, NodeView};
use crate::events::{Event, InsertionReport};
use core::fmt::{self, Display, Formatter};

impl<'a, K: Display, V: Display> Display for NodeView<'a, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node[{}] {{ KEY: {} VALUE: {} HASH: {} }}",
            self.position, self.key, self.value, self.hash
        )
    }
}

impl<'a, K: Display, V: Display> Display for ChainDescription<'a, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "bucket[{}]", self.index)?;
        for node in &self.nodes {
            write!(f, " {node} --->")?;
        }
        f.write_str(" NULL")
    }
}

impl<'a, K: Display, V: Display> Display for InsertionReport<'a, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let n = self.capacity;
        writeln!(f, "KEY({}) <-> VALUE({})", self.key, self.value)?;
        writeln!(f, "Size of Buckets = {n}")?;
        writeln!(f, "Hash of key - {} = {}", self.key, self.native_hash)?;
        write!(
            f,
            "Index in buckets for this Node = hash & (n - 1) = {h} & ({n} - 1) = {h} & {m} = {bh:b} & {m:b} = {i}",
            h = self.hash,
            m = self.mask,
            bh = self.hash as u32,
            i = self.index,
        )
    }
}

impl<'a, K: Display, V: Display> Display for Event<'a, K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Event::InsertionStarted { key, value } => {
                write!(f, "Inserting pair ({key}, {value})")
            }
            Event::LoadFactorObserved { value } => write!(f, "LOAD FACTOR = {value}"),
            Event::ThresholdChanged {
                old_threshold,
                new_threshold,
                non_empty_buckets,
            } => write!(
                f,
                "threshold = {new_threshold}, old threshold = {old_threshold}, full buckets = {non_empty_buckets}"
            ),
            Event::InsertionComputed(report) => Display::fmt(report, f),
            Event::BucketsDumped { buckets } => {
                for (i, chain) in buckets.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    Display::fmt(chain, f)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(position: usize, key: &'a &'static str, value: &'a i32, hash: i32) -> NodeView<'a, &'static str, i32> {
        NodeView {
            position,
            key,
            value,
            hash,
        }
    }

    #[test]
    fn chain_lines() {
        let (k0, k11, v0, v11) = ("0", "11", 0, 11);
        let chain = ChainDescription {
            index: 0,
            nodes: vec![view(0, &k0, &v0, 48), view(1, &k11, &v11, 1568)],
        };
        assert_eq!(
            chain.to_string(),
            "bucket[0] Node[0] { KEY: 0 VALUE: 0 HASH: 48 } ---> Node[1] { KEY: 11 VALUE: 11 HASH: 1568 } ---> NULL"
        );
        let empty: ChainDescription<'_, &str, i32> = ChainDescription {
            index: 3,
            nodes: Vec::new(),
        };
        assert_eq!(empty.to_string(), "bucket[3] NULL");
    }

    #[test]
    fn insertion_report_text() {
        let r = InsertionReport::new(&"11", &11, 1568, 1568, 16, 0);
        let text = Event::InsertionComputed(r).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "KEY(11) <-> VALUE(11)");
        assert_eq!(lines[1], "Size of Buckets = 16");
        assert_eq!(lines[2], "Hash of key - 11 = 1568");
        assert_eq!(
            lines[3],
            "Index in buckets for this Node = hash & (n - 1) = 1568 & (16 - 1) = 1568 & 15 = 11000100000 & 1111 = 0"
        );
    }

    #[test]
    fn short_events() {
        let e: Event<'_, &str, i32> = Event::ThresholdChanged {
            old_threshold: 12,
            new_threshold: 24,
            non_empty_buckets: 11,
        };
        assert_eq!(e.to_string(), "threshold = 24, old threshold = 12, full buckets = 11");
        let e: Event<'_, &str, i32> = Event::InsertionStarted {
            key: &"a",
            value: &1,
        };
        assert_eq!(e.to_string(), "Inserting pair (a, 1)");
        let e: Event<'_, &str, i32> = Event::LoadFactorObserved { value: 0.5 };
        assert_eq!(e.to_string(), "LOAD FACTOR = 0.5");
    }

    #[test]
    fn dump_joins_buckets_by_line() {
        let (k, v) = ("5", 5);
        let buckets = vec![
            ChainDescription {
                index: 0,
                nodes: Vec::new(),
            },
            ChainDescription {
                index: 1,
                nodes: vec![view(0, &k, &v, 53)],
            },
        ];
        let e = Event::BucketsDumped { buckets: &buckets };
        assert_eq!(
            e.to_string(),
            "bucket[0] NULL\nbucket[1] Node[0] { KEY: 5 VALUE: 5 HASH: 53 } ---> NULL"
        );
    }
}
