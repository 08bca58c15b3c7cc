use crate::slot::Slot;
use crate::trace::{trace, warn};
use std::fmt;
use std::mem::ManuallyDrop;

/// One-shot acknowledgement returned by [`WaitQueue::dequeue`](crate::WaitQueue::dequeue).
///
/// Calling [`complete`](Completion::complete) marks the item as fully processed and releases the
/// producer blocked in [`WaitQueue::enqueue`](crate::WaitQueue::enqueue). It consumes the handle,
/// so completing twice does not compile.
///
/// ## Misuse
/// Dropping the handle without completing it does **not** release the producer. The producer stays
/// blocked forever and, once the ring wraps around to the same slot, so does every other producer.
/// With the `tracing` feature enabled this is reported as a warning.
#[must_use = "the producer stays blocked until `complete` is called"]
pub struct Completion<'a, T> {
    slot: &'a Slot<T>,
    index: usize,
}

impl<'a, T> Completion<'a, T> {
    #[inline]
    pub(crate) const fn new(slot: &'a Slot<T>, index: usize) -> Self {
        Self { slot, index }
    }

    /// Ring index of the slot the item was dequeued from.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Signal that the dequeued item has been processed and wake its producer.
    #[inline]
    pub fn complete(self) {
        // the destructor only reports a missing completion
        let this = ManuallyDrop::new(self);
        this.slot.mark_done();
        trace!(index = this.index, "slot done");
    }
}

impl<T> fmt::Debug for Completion<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").field("index", &self.index).finish()
    }
}

impl<T> Drop for Completion<'_, T> {
    fn drop(&mut self) {
        warn!(index = self.index, "completion dropped without being completed, producer stays blocked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Status;

    #[test]
    fn should_mark_slot_done() {
        let slot = Slot::new();
        assert!(slot.try_reserve());
        unsafe { slot.publish(5u8) };
        assert!(slot.try_claim());
        assert_eq!(5, unsafe { slot.take() });

        let completion = Completion::new(&slot, 3);
        assert_eq!(3, completion.index());
        completion.complete();
        assert_eq!(Status::Done, slot.status());
    }

    #[test]
    fn should_leave_slot_claimed_when_dropped() {
        let slot = Slot::new();
        assert!(slot.try_reserve());
        unsafe { slot.publish(5u8) };
        assert!(slot.try_claim());
        assert_eq!(5, unsafe { slot.take() });

        drop(Completion::new(&slot, 0));
        assert_eq!(Status::Claimed, slot.status());
    }
}
