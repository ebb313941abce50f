//! Open sets for the A* frontier.
//!
//! The search only needs three things from its frontier: insert a key or
//! lower its priority, pop the key with the smallest priority, and report
//! emptiness. Two implementations are provided. [`LinearOpenSet`] scans a
//! vector and is handy for small graphs and for cross-checking;
//! [`HeapOpenSet`] is a binary heap with lazy invalidation and is the
//! default.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// A priority-keyed frontier.
///
/// Keys are unique: pushing a key that is already present keeps the smaller
/// of the two priorities. Ties between equal priorities are broken by
/// insertion order, oldest first.
pub trait OpenSet<K, P> {
    /// Insert `key`, or lower its priority if it is already queued.
    fn push_or_decrease(&mut self, key: K, priority: P);

    /// Remove and return the key with the smallest priority.
    fn pop_min(&mut self) -> Option<K>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Vector-backed open set with linear-scan pops.
#[derive(Debug, Clone)]
pub struct LinearOpenSet<K, P> {
    entries: Vec<(K, P)>,
}

impl<K, P> LinearOpenSet<K, P> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K, P> Default for LinearOpenSet<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, P: PartialOrd> OpenSet<K, P> for LinearOpenSet<K, P> {
    fn push_or_decrease(&mut self, key: K, priority: P) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                if priority < *existing {
                    *existing = priority;
                }
            }
            None => self.entries.push((key, priority)),
        }
    }

    fn pop_min(&mut self) -> Option<K> {
        let mut best: Option<usize> = None;
        for (i, (_, p)) in self.entries.iter().enumerate() {
            // Strictly smaller, so the earliest entry wins a tie.
            if best.is_none_or(|b| *p < self.entries[b].1) {
                best = Some(i);
            }
        }
        // `remove` keeps the remaining entries in insertion order.
        best.map(|i| self.entries.remove(i).0)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Binary-heap open set.
///
/// Decreasing a key pushes a fresh heap entry; the old one stays in the heap
/// and is skipped when popped because it no longer matches the live entry.
#[derive(Debug, Clone)]
pub struct HeapOpenSet<K, P> {
    heap: BinaryHeap<Reverse<(P, u64, K)>>,
    live: HashMap<K, (P, u64)>,
    next_seq: u64,
}

impl<K, P> HeapOpenSet<K, P> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<K, P> Default for HeapOpenSet<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> OpenSet<K, P> for HeapOpenSet<K, P>
where
    K: Ord + Hash + Clone,
    P: Ord + Copy,
{
    fn push_or_decrease(&mut self, key: K, priority: P) {
        if matches!(self.live.get(&key), Some(&(existing, _)) if existing <= priority) {
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(key.clone(), (priority, seq));
        self.heap.push(Reverse((priority, seq, key)));
    }

    fn pop_min(&mut self) -> Option<K> {
        while let Some(Reverse((priority, seq, key))) = self.heap.pop() {
            if self.live.get(&key) == Some(&(priority, seq)) {
                self.live.remove(&key);
                return Some(key);
            }
        }
        None
    }

    fn len(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<Q: OpenSet<u32, i64>>(mut set: Q) -> Vec<u32> {
        let mut order = Vec::new();
        while let Some(k) = set.pop_min() {
            order.push(k);
        }
        order
    }

    fn fill<Q: OpenSet<u32, i64>>(set: &mut Q, items: &[(u32, i64)]) {
        for &(k, p) in items {
            set.push_or_decrease(k, p);
        }
    }

    fn both() -> Vec<Box<dyn OpenSet<u32, i64>>> {
        vec![Box::new(LinearOpenSet::new()), Box::new(HeapOpenSet::new())]
    }

    #[test]
    fn pops_in_priority_order() {
        let items = [(1, 30), (2, 10), (3, 20), (4, 5)];

        let mut linear = LinearOpenSet::new();
        fill(&mut linear, &items);
        let mut heap = HeapOpenSet::new();
        fill(&mut heap, &items);

        assert_eq!(drain(linear), vec![4, 2, 3, 1]);
        assert_eq!(drain(heap), vec![4, 2, 3, 1]);
    }

    #[test]
    fn decrease_key_reorders() {
        for mut set in both() {
            set.push_or_decrease(1, 10);
            set.push_or_decrease(2, 20);
            set.push_or_decrease(2, 5);
            assert_eq!(set.len(), 2);
            assert_eq!(set.pop_min(), Some(2));
            assert_eq!(set.pop_min(), Some(1));
            assert_eq!(set.pop_min(), None);
            assert!(set.is_empty());
        }
    }

    #[test]
    fn higher_priority_is_ignored() {
        for mut set in both() {
            set.push_or_decrease(1, 10);
            set.push_or_decrease(2, 15);
            set.push_or_decrease(1, 20);
            assert_eq!(set.len(), 2);
            assert_eq!(set.pop_min(), Some(1));
        }
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let items = [(7, 10), (3, 10), (9, 10)];

        let mut linear = LinearOpenSet::new();
        fill(&mut linear, &items);
        let mut heap = HeapOpenSet::new();
        fill(&mut heap, &items);

        assert_eq!(drain(linear), vec![7, 3, 9]);
        assert_eq!(drain(heap), vec![7, 3, 9]);
    }

    #[test]
    fn key_can_be_requeued_after_pop() {
        let mut heap = HeapOpenSet::new();
        heap.push_or_decrease(1u32, 10i64);
        assert_eq!(heap.pop_min(), Some(1));
        heap.push_or_decrease(1, 50);
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.pop_min(), Some(1));
    }
}
