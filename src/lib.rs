//! Bounded, multi producer & multi consumer (MPMC) ring buffer with acknowledged delivery.
//!
//! Producers do not just wait for buffer space: [`WaitQueue::enqueue`] returns only once the
//! consumer that dequeued the item has called [`Completion::complete`] on it. The number of items a
//! producer side can have in flight is therefore bounded by the ring capacity, and a slot is not
//! reused before its consumer is done with it.
//!
//! Ordering is only guaranteed per slot. With several producers items may be consumed in a different
//! order than `enqueue` was called; a single producer and single consumer observe FIFO order.
//!
//! ## Examples
//! Hand an item to a worker thread and wait until it has been processed.
//! ```
//! use waitq::WaitQueue;
//!
//! let queue = WaitQueue::new(4).unwrap();
//!
//! std::thread::scope(|s| {
//!     s.spawn(|| {
//!         let (value, completion) = queue.dequeue();
//!         assert_eq!("job", value);
//!         // process the value, then release the producer
//!         completion.complete();
//!     });
//!
//!     // returns only after the worker called `complete`
//!     queue.enqueue("job");
//! });
//! ```
//! Construction fails unless the capacity is a positive power of two.
//! ```
//! use waitq::{WaitQueue, error::Error};
//!
//! assert_eq!(Error::InvalidCapacity(3), WaitQueue::<u64>::new(3).unwrap_err());
//! ```

mod completion;
mod cursor;
pub mod error;
mod slot;
pub mod trace;

use crate::cursor::Cursor;
use crate::error::invalid_capacity;
use crate::slot::Slot;
use crate::trace::{debug, trace};
use crossbeam_utils::Backoff;
use std::fmt;

// re-export
pub use completion::Completion;
pub use error::Result;

/// Fixed capacity MPMC queue whose producers block until their item is acknowledged.
///
/// Share it between threads by reference (e.g. `std::thread::scope`) or through an `Arc`.
pub struct WaitQueue<T> {
    slots: Box<[Slot<T>]>,
    write: Cursor,
    read: Cursor,
    mask: usize,
}

impl<T> WaitQueue<T> {
    /// Create a queue with `capacity` slots, all of them empty.
    ///
    /// ## Errors
    /// [`Error::InvalidCapacity`](error::Error::InvalidCapacity) when `capacity` is not a positive
    /// power of two.
    pub fn new(capacity: usize) -> Result<Self> {
        if !capacity.is_power_of_two() {
            return Err(invalid_capacity(capacity));
        }
        let mask = capacity - 1;
        debug!(capacity, "creating wait queue");
        Ok(Self {
            slots: (0..capacity).map(|_| Slot::new()).collect(),
            write: Cursor::new(mask),
            read: Cursor::new(mask),
            mask,
        })
    }

    /// Number of slots in the ring.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Insert `value` and block until a consumer has dequeued **and** completed it.
    ///
    /// While the ring is full the caller spins and yields until a slot frees up, the queue never
    /// rejects an item. There is no timeout: if the consumer drops its [`Completion`] without
    /// completing it, this call never returns.
    pub fn enqueue(&self, value: T) {
        let (observed, index) = self.reserve();
        let slot = &self.slots[index];
        // SAFETY: `reserve` won the `Empty -> Reserved` transition for this slot
        unsafe { slot.publish(value) };
        trace!(index, "slot published");

        self.write.advance(observed, index);

        slot.wait_done();
        trace!(index, "slot released");
    }

    /// Block until an item is available and return it together with its [`Completion`].
    ///
    /// The completion must be called exactly once after the value has been processed, otherwise
    /// the producer of that item never returns from [`enqueue`](Self::enqueue).
    pub fn dequeue(&self) -> (T, Completion<'_, T>) {
        let (observed, index) = self.claim();
        let slot = &self.slots[index];
        // SAFETY: `claim` won the `Published -> Claimed` transition for this slot
        let value = unsafe { slot.take() };
        trace!(index, "slot consumed");

        self.read.advance(observed, index);

        (value, Completion::new(slot, index))
    }

    /// Approximate number of items between the read and the write cursor.
    ///
    /// Both cursors are read independently, so under concurrent use the result is not a consistent
    /// snapshot. A completely full ring reads as `0` because both cursors wrap to the same index.
    pub fn len(&self) -> usize {
        let write = self.write.load();
        let read = self.read.load();
        if read > write {
            write + self.capacity() - read
        } else {
            write - read
        }
    }

    /// Returns `true` when [`len`](Self::len) is zero. Subject to the same approximation.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scan from the write cursor for an empty slot and reserve it. Returns the cursor value the
    /// scan started from and the reserved index.
    fn reserve(&self) -> (usize, usize) {
        let backoff = Backoff::new();
        loop {
            let observed = self.write.load();
            let mut index = observed;
            for _ in 0..self.capacity() {
                if self.slots[index].try_reserve() {
                    trace!(index, "slot reserved");
                    return (observed, index);
                }
                index = (index + 1) & self.mask;
            }
            // ring full
            backoff.snooze();
        }
    }

    /// Scan from the read cursor for a published slot and claim it. Returns the cursor value the
    /// scan started from and the claimed index.
    fn claim(&self) -> (usize, usize) {
        let backoff = Backoff::new();
        loop {
            let observed = self.read.load();
            let mut index = observed;
            for _ in 0..self.capacity() {
                if self.slots[index].try_claim() {
                    return (observed, index);
                }
                index = (index + 1) & self.mask;
            }
            // ring empty
            backoff.snooze();
        }
    }
}

impl<T> fmt::Debug for WaitQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitQueue")
            .field("capacity", &self.capacity())
            .field("write", &self.write.load())
            .field("read", &self.read.load())
            .finish()
    }
}
