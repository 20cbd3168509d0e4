//! FIFO of mentions awaiting verification.
//!
//! Insertion order is verification order. A pair can be queued at most once
//! at a time; it becomes queueable again as soon as the verifier pops it.

use std::collections::{HashSet, VecDeque};

use crate::types::Mention;

/// Deduplicating FIFO of pending mentions.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<Mention>,

    /// Pairs currently in `entries`, for O(1) duplicate checks.
    queued: HashSet<Mention>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if this pair is already waiting.
    pub fn contains(&self, mention: &Mention) -> bool {
        self.queued.contains(mention)
    }

    /// Appends a mention at the tail.
    ///
    /// Returns `false` (and leaves the queue unchanged) if the pair is
    /// already queued.
    pub fn push(&mut self, mention: Mention) -> bool {
        if !self.queued.insert(mention.clone()) {
            return false;
        }
        self.entries.push_back(mention);
        true
    }

    /// Removes and returns the oldest mention.
    pub fn pop(&mut self) -> Option<Mention> {
        let mention = self.entries.pop_front()?;
        self.queued.remove(&mention);
        Some(mention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn m(source: &str, target: &str) -> Mention {
        Mention::new(source, target)
    }

    #[test]
    fn new_queue_is_empty() {
        let mut queue = PendingQueue::new();
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn pops_in_insertion_order() {
        let mut queue = PendingQueue::new();
        queue.push(m("https://a.example/1", "https://t.example/"));
        queue.push(m("https://a.example/2", "https://t.example/"));
        queue.push(m("https://a.example/3", "https://t.example/"));

        assert_eq!(queue.pop().unwrap().source, "https://a.example/1");
        assert_eq!(queue.pop().unwrap().source, "https://a.example/2");
        assert_eq!(queue.pop().unwrap().source, "https://a.example/3");
        assert!(queue.pop().is_none());
    }

    #[test]
    fn duplicate_push_is_rejected() {
        let mut queue = PendingQueue::new();
        assert!(queue.push(m("s", "t")));
        assert!(!queue.push(m("s", "t")));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn same_source_different_target_is_not_a_duplicate() {
        let mut queue = PendingQueue::new();
        assert!(queue.push(m("s", "t1")));
        assert!(queue.push(m("s", "t2")));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn pair_is_queueable_again_after_pop() {
        let mut queue = PendingQueue::new();
        queue.push(m("s", "t"));
        queue.pop();

        assert!(!queue.contains(&m("s", "t")));
        assert!(queue.push(m("s", "t")));
    }

    proptest! {
        /// The queue never holds the same pair twice, and the lookup set
        /// tracks exactly what is queued.
        #[test]
        fn queue_and_index_stay_in_sync(
            ops in prop::collection::vec(prop_oneof![
                (0u8..4, 0u8..4).prop_map(Some),
                Just(None),
            ], 0..60)
        ) {
            let mut queue = PendingQueue::new();
            for op in ops {
                match op {
                    Some((s, t)) => {
                        queue.push(m(&format!("s{s}"), &format!("t{t}")));
                    }
                    None => {
                        queue.pop();
                    }
                }

                let entries: Vec<_> = queue.entries.iter().cloned().collect();
                let unique: HashSet<_> = entries.iter().cloned().collect();
                prop_assert_eq!(entries.len(), unique.len());
                prop_assert_eq!(&unique, &queue.queued);
            }
        }
    }
}
