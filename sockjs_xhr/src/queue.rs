//! FIFO buffer of decoded messages awaiting delivery.

use alloc::{collections::VecDeque, string::String};

/// Messages decoded from `a` frames, in server order.
///
/// Filled by the poller, drained one at a time by `receive`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQueue {
    messages: VecDeque<String>,
}

impl MessageQueue {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }

    /// Append messages to the back, preserving their order.
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, messages: I) {
        self.messages.extend(messages);
    }

    /// Take the oldest message.
    pub fn pop_front(&mut self) -> Option<String> {
        self.messages.pop_front()
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn pops_in_insertion_order_across_batches() {
        let mut queue = MessageQueue::new();
        queue.extend(vec!["a".into(), "b".into()]);
        queue.extend(vec!["c".into()]);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop_front().as_deref(), Some("a"));
        assert_eq!(queue.pop_front().as_deref(), Some("b"));
        assert_eq!(queue.pop_front().as_deref(), Some("c"));
        assert_eq!(queue.pop_front(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_batch_leaves_queue_empty() {
        let mut queue = MessageQueue::default();
        queue.extend(Vec::<String>::new());
        assert!(queue.is_empty());
    }

    #[cfg(feature = "bolero")]
    mod proptests {
        use super::*;

        #[test]
        fn prop_drains_concatenation_of_batches() {
            bolero::check!()
                .with_type::<Vec<Vec<String>>>()
                .for_each(|batches| {
                    let mut queue = MessageQueue::new();
                    for batch in batches {
                        queue.extend(batch.iter().cloned());
                    }

                    let expected: Vec<String> = batches.iter().flatten().cloned().collect();
                    assert_eq!(queue.len(), expected.len());

                    let drained: Vec<String> = core::iter::from_fn(|| queue.pop_front()).collect();
                    assert_eq!(drained, expected);
                    assert!(queue.is_empty());
                });
        }

        #[test]
        fn prop_interleaved_pops_keep_order() {
            bolero::check!()
                .with_type::<Vec<(Vec<String>, u8)>>()
                .for_each(|steps| {
                    let mut queue = MessageQueue::new();
                    let mut popped = Vec::new();

                    for (batch, pops) in steps {
                        queue.extend(batch.iter().cloned());
                        for _ in 0..*pops {
                            popped.extend(queue.pop_front());
                        }
                    }
                    popped.extend(core::iter::from_fn(|| queue.pop_front()));

                    let expected: Vec<String> =
                        steps.iter().flat_map(|(batch, _)| batch.iter().cloned()).collect();
                    assert_eq!(popped, expected);
                });
        }
    }
}
