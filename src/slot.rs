//! Ring cell and its state machine.
//!
//! A slot only ever moves forward through the cycle below, every transition except the reset
//! being driven by a single winning thread:
//!
//! ```txt
//! EMPTY -> RESERVED    producer wins the CAS and starts writing the value
//! RESERVED -> PUBLISHED value written, visible to consumers
//! PUBLISHED -> CLAIMED consumer wins the CAS and moves the value out
//! CLAIMED -> DONE      completion handle fired (under the slot lock)
//! DONE -> EMPTY        producer observed DONE and released the slot (under the slot lock)
//! ```

use parking_lot::{Condvar, Mutex};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU8, Ordering};

/// Slot status, stored as `u8` inside [`Slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Status {
    Empty = 0,
    Reserved = 1,
    Published = 2,
    Claimed = 3,
    Done = 4,
}

impl Status {
    #[inline]
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Status::Empty,
            1 => Status::Reserved,
            2 => Status::Published,
            3 => Status::Claimed,
            4 => Status::Done,
            _ => unreachable!(),
        }
    }
}

/// One ring cell. The value is only initialised while the status is `Reserved` (being written),
/// `Published` or `Claimed` (being moved out).
pub(crate) struct Slot<T> {
    status: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
    lock: Mutex<()>,
    done: Condvar,
}

// SAFETY: access to `value` is serialised by the status CAS, only the thread that won the
// `Empty -> Reserved` transition writes it and only the thread that won `Published -> Claimed`
// reads it.
unsafe impl<T: Send> Send for Slot<T> {}
unsafe impl<T: Send> Sync for Slot<T> {}

impl<T> Slot<T> {
    pub(crate) const fn new() -> Self {
        Self {
            status: AtomicU8::new(Status::Empty as u8),
            value: UnsafeCell::new(MaybeUninit::uninit()),
            lock: Mutex::new(()),
            done: Condvar::new(),
        }
    }

    #[inline]
    pub(crate) fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Attempt `Empty -> Reserved`. On success the caller owns the slot until it publishes.
    #[inline]
    pub(crate) fn try_reserve(&self) -> bool {
        self.transition(Status::Empty, Status::Reserved)
    }

    /// Attempt `Published -> Claimed`. On success the caller must [`take`](Self::take) the value.
    #[inline]
    pub(crate) fn try_claim(&self) -> bool {
        self.transition(Status::Published, Status::Claimed)
    }

    #[inline]
    fn transition(&self, from: Status, to: Status) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    /// Write the value and make it visible to consumers.
    ///
    /// # Safety
    /// Caller must have won [`try_reserve`](Self::try_reserve) for this cycle.
    #[inline]
    pub(crate) unsafe fn publish(&self, value: T) {
        debug_assert_eq!(Status::Reserved, self.status());
        unsafe { (*self.value.get()).write(value) };
        self.status.store(Status::Published as u8, Ordering::Release);
    }

    /// Move the value out of the slot. The slot stays `Claimed` until it is marked done.
    ///
    /// # Safety
    /// Caller must have won [`try_claim`](Self::try_claim) for this cycle.
    #[inline]
    pub(crate) unsafe fn take(&self) -> T {
        debug_assert_eq!(Status::Claimed, self.status());
        unsafe { (*self.value.get()).assume_init_read() }
    }

    /// Consumer side of the rendezvous: `Claimed -> Done` and wake the producer.
    pub(crate) fn mark_done(&self) {
        let _guard = self.lock.lock();
        debug_assert_eq!(Status::Claimed, self.status(), "slot completed more than once");
        self.status.store(Status::Done as u8, Ordering::Release);
        self.done.notify_one();
    }

    /// Producer side of the rendezvous: block until the slot is `Done`, then reset it to `Empty`.
    pub(crate) fn wait_done(&self) {
        let mut guard = self.lock.lock();
        // wakeups may be spurious, only the status is authoritative
        while self.status() != Status::Done {
            self.done.wait(&mut guard);
        }
        self.status.store(Status::Empty as u8, Ordering::Release);
    }
}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        // a published value nobody claimed still has to be dropped
        if Status::from_u8(*self.status.get_mut()) == Status::Published {
            // SAFETY: `Published` means the value is initialised and no consumer claimed it
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}
