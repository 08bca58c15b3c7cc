use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared scan hint for producers (write cursor) or consumers (read cursor). Ownership of a slot
/// is decided by its status alone, so the cursor may lag or lead the real occupancy.
#[derive(Debug)]
pub(crate) struct Cursor {
    position: CachePadded<AtomicUsize>, // always within `0..=mask`
    mask: usize,
}

impl Cursor {
    pub(crate) fn new(mask: usize) -> Self {
        Self {
            position: CachePadded::new(AtomicUsize::new(0)),
            mask,
        }
    }

    /// Current cursor index.
    #[inline]
    pub(crate) fn load(&self) -> usize {
        self.position.load(Ordering::Acquire)
    }

    /// Move the cursor past `index`, given the value `observed` when the scan started. Gives up as
    /// soon as another thread has already moved it further, taking wraparound into account.
    pub(crate) fn advance(&self, mut observed: usize, index: usize) {
        // unmasked, so that `next == capacity` marks a wrap
        let next = index + 1;
        while let Err(current) =
            self.position
                .compare_exchange(observed, next & self.mask, Ordering::AcqRel, Ordering::Acquire)
        {
            if self.superseded(observed, current, next) {
                break;
            }
            observed = current;
        }
    }

    /// Whether the cursor moving from `observed` to `current` already covers `next`.
    #[inline]
    const fn superseded(&self, observed: usize, current: usize, next: usize) -> bool {
        (current > observed && current > next)
            || (current < observed && (next & !self.mask == 0 || next & self.mask < current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_advance_past_index() {
        let cursor = Cursor::new(7);
        cursor.advance(0, 0);
        assert_eq!(1, cursor.load());
        cursor.advance(1, 4);
        assert_eq!(5, cursor.load());
    }

    #[test]
    fn should_wrap_around() {
        let cursor = Cursor::new(3);
        cursor.advance(0, 3);
        assert_eq!(0, cursor.load());
    }

    #[test]
    fn should_keep_cursor_that_moved_further() {
        let cursor = Cursor::new(7);
        cursor.advance(0, 5);
        assert_eq!(6, cursor.load());

        // a slower thread that claimed index 2 from the same starting point
        cursor.advance(0, 2);
        assert_eq!(6, cursor.load());
    }

    #[test]
    fn should_keep_cursor_that_wrapped() {
        let cursor = Cursor::new(7);
        cursor.advance(0, 4);
        assert_eq!(5, cursor.load());

        // another thread wrapped the cursor to 1 while we were claiming index 6
        cursor.advance(5, 0);
        assert_eq!(1, cursor.load());
        cursor.advance(5, 6);
        assert_eq!(1, cursor.load());
    }

    #[test]
    fn should_retry_when_cursor_lags() {
        let cursor = Cursor::new(7);
        cursor.advance(0, 1);
        assert_eq!(2, cursor.load());

        // scan started at 0 and claimed index 4, cursor at 2 has not caught up yet
        cursor.advance(0, 4);
        assert_eq!(5, cursor.load());
    }

    #[test]
    fn should_stay_at_zero_for_single_slot() {
        let cursor = Cursor::new(0);
        cursor.advance(0, 0);
        assert_eq!(0, cursor.load());
    }
}
