//! BucketArray: power-of-two array of singly-linked collision chains.
//!
//! Each slot owns the head of its chain and every node owns its successor,
//! so dropping a slot drops the whole chain. New nodes are appended at the
//! tail, which keeps each chain in insertion order; rehashing drains slots
//! in index order and chains head first, so relative order survives a
//! resize. All traversals are loops, never recursion.

use core::borrow::Borrow;

pub(crate) type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: i32,
    next: Link<K, V>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, hash: i32) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            hash,
            next: None,
        })
    }
}

pub(crate) struct BucketArray<K, V> {
    slots: Box<[Link<K, V>]>,
}

impl<K, V> BucketArray<K, V> {
    /// `capacity` must be a power of two.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        let slots = std::iter::repeat_with(|| None).take(capacity).collect();
        Self { slots }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn chain(&self, index: usize) -> Chain<'_, K, V> {
        Chain {
            next: self.slots[index].as_deref(),
        }
    }

    pub(crate) fn find<Q>(&self, index: usize, hash: i32, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.chain(index)
            .find(|n| n.hash == hash && n.key.borrow() == key)
    }

    pub(crate) fn find_mut<Q>(&mut self, index: usize, hash: i32, key: &Q) -> Option<&mut Node<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.slots[index].as_deref_mut();
        while let Some(node) = cur {
            if node.hash == hash && node.key.borrow() == key {
                return Some(node);
            }
            cur = node.next.as_deref_mut();
        }
        None
    }

    /// Last node of the chain at `index`.
    pub(crate) fn tail(&self, index: usize) -> Option<&Node<K, V>> {
        self.chain(index).last()
    }

    /// Appends `node` at the tail of chain `index`; returns its position.
    pub(crate) fn push_back(&mut self, index: usize, node: Box<Node<K, V>>) -> usize {
        let mut link = &mut self.slots[index];
        let mut position = 0;
        loop {
            match link {
                Some(existing) => link = &mut existing.next,
                None => {
                    *link = Some(node);
                    return position;
                }
            }
            position += 1;
        }
    }

    /// Detaches the matching node, splicing its successor into its place.
    pub(crate) fn unlink<Q>(&mut self, index: usize, hash: i32, key: &Q) -> Option<Box<Node<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let position = self
            .chain(index)
            .position(|n| n.hash == hash && n.key.borrow() == key)?;
        let mut link = &mut self.slots[index];
        for _ in 0..position {
            link = &mut link.as_mut()?.next;
        }
        let mut removed = link.take()?;
        *link = removed.next.take();
        Some(removed)
    }

    pub(crate) fn non_empty(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Detaches every node in bucket order then chain order, leaving the
    /// array empty.
    pub(crate) fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            slots: self.slots.iter_mut(),
            current: None,
        }
    }

    pub(crate) fn describe(&self) -> Vec<ChainDescription<'_, K, V>> {
        (0..self.capacity())
            .map(|index| ChainDescription {
                index,
                nodes: self
                    .chain(index)
                    .enumerate()
                    .map(|(position, n)| NodeView {
                        position,
                        key: &n.key,
                        value: &n.value,
                        hash: n.hash,
                    })
                    .collect(),
            })
            .collect()
    }
}

impl<K, V> Drop for BucketArray<K, V> {
    fn drop(&mut self) {
        // Unlink node by node so long chains cannot exhaust the stack
        // through nested Box drops.
        for slot in self.slots.iter_mut() {
            let mut link = slot.take();
            while let Some(mut node) = link {
                link = node.next.take();
            }
        }
    }
}

pub(crate) struct Chain<'a, K, V> {
    next: Option<&'a Node<K, V>>,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = &'a Node<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(node)
    }
}

pub(crate) struct Drain<'a, K, V> {
    slots: core::slice::IterMut<'a, Link<K, V>>,
    current: Link<K, V>,
}

impl<'a, K, V> Iterator for Drain<'a, K, V> {
    type Item = Box<Node<K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(mut node) = self.current.take() {
                self.current = node.next.take();
                return Some(node);
            }
            self.current = self.slots.next()?.take();
        }
    }
}

impl<'a, K, V> Drop for Drain<'a, K, V> {
    fn drop(&mut self) {
        // Nodes not pulled are discarded, matching a fully drained array.
        for _ in self.by_ref() {}
    }
}

/// One node of a chain as seen by `HashTable::dump_buckets`.
#[derive(Debug, PartialEq)]
pub struct NodeView<'a, K, V> {
    /// Zero-based position within the chain.
    pub position: usize,
    pub key: &'a K,
    pub value: &'a V,
    pub hash: i32,
}

/// Snapshot of one bucket. An empty `nodes` list is the empty-bucket marker.
#[derive(Debug, PartialEq)]
pub struct ChainDescription<'a, K, V> {
    pub index: usize,
    pub nodes: Vec<NodeView<'a, K, V>>,
}

impl<'a, K, V> ChainDescription<'a, K, V> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_at(a: &BucketArray<&'static str, i32>, index: usize) -> Vec<&'static str> {
        a.chain(index).map(|n| n.key).collect()
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let mut a = BucketArray::with_capacity(4);
        assert_eq!(a.push_back(1, Node::new("a", 1, 1)), 0);
        assert_eq!(a.push_back(1, Node::new("b", 2, 5)), 1);
        assert_eq!(a.push_back(1, Node::new("c", 3, 9)), 2);
        assert_eq!(keys_at(&a, 1), vec!["a", "b", "c"]);
        assert_eq!(a.tail(1).map(|n| n.key), Some("c"));
        assert!(a.tail(0).is_none());
        assert_eq!(a.non_empty(), 1);
    }

    #[test]
    fn find_requires_matching_hash_and_key() {
        let mut a = BucketArray::with_capacity(4);
        a.push_back(0, Node::new("a", 1, 4));
        a.push_back(0, Node::new("b", 2, 8));
        assert_eq!(a.find(0, 8, &"b").map(|n| n.value), Some(2));
        assert!(a.find(0, 4, &"b").is_none());
        assert!(a.find(0, 12, &"c").is_none());

        a.find_mut(0, 4, &"a").unwrap().value = 10;
        assert_eq!(a.find(0, 4, &"a").map(|n| n.value), Some(10));
    }

    #[test]
    fn unlink_head_middle_and_tail() {
        let mut a = BucketArray::with_capacity(2);
        for (k, h) in [("a", 0), ("b", 2), ("c", 4), ("d", 6)] {
            a.push_back(0, Node::new(k, 0, h));
        }
        assert_eq!(a.unlink(0, 2, &"b").map(|n| n.key), Some("b"));
        assert_eq!(keys_at(&a, 0), vec!["a", "c", "d"]);
        assert_eq!(a.unlink(0, 0, &"a").map(|n| n.key), Some("a"));
        assert_eq!(keys_at(&a, 0), vec!["c", "d"]);
        assert_eq!(a.unlink(0, 6, &"d").map(|n| n.key), Some("d"));
        assert_eq!(keys_at(&a, 0), vec!["c"]);
        assert!(a.unlink(0, 6, &"d").is_none());
        assert_eq!(a.unlink(0, 4, &"c").map(|n| n.key), Some("c"));
        assert_eq!(a.non_empty(), 0);
    }

    #[test]
    fn drain_visits_buckets_then_chains_and_empties() {
        let mut a = BucketArray::with_capacity(4);
        a.push_back(2, Node::new("x", 0, 2));
        a.push_back(0, Node::new("a", 0, 0));
        a.push_back(0, Node::new("b", 0, 4));
        a.push_back(2, Node::new("y", 0, 6));
        let order: Vec<_> = a.drain().map(|n| n.key).collect();
        assert_eq!(order, vec!["a", "b", "x", "y"]);
        assert_eq!(a.non_empty(), 0);
        assert!(a.drain().next().is_none());
    }

    #[test]
    fn describe_marks_empty_buckets() {
        let mut a = BucketArray::with_capacity(2);
        a.push_back(1, Node::new("k", 7, 1));
        let d = a.describe();
        assert_eq!(d.len(), 2);
        assert!(d[0].is_empty());
        assert_eq!(d[1].len(), 1);
        assert_eq!(
            d[1].nodes[0],
            NodeView {
                position: 0,
                key: &"k",
                value: &7,
                hash: 1
            }
        );
    }

    #[test]
    fn long_chain_drops_without_recursion() {
        let mut a = BucketArray::with_capacity(1);
        let mut link: Link<u32, ()> = None;
        // Build the chain head-first directly to keep the test linear.
        for k in 0..200_000u32 {
            let mut n = Node::new(k, (), 0);
            n.next = link;
            link = Some(n);
        }
        a.slots[0] = link;
        assert_eq!(a.chain(0).count(), 200_000);
        drop(a);
    }
}
