//! Embedded reference counting for manually managed nodes
//!
//! Nodes in a lock-free structure can stay reachable through stale pointers
//! for a short window after being unlinked. Embedding a `RefCount` in the
//! node lets each logical holder release independently; whichever release
//! brings the count to zero is told to deallocate.

use core::sync::atomic::{fence, AtomicUsize, Ordering};

/// An atomic reference count embedded in a user node type.
///
/// Starts at the number of logical holders the node will ever have. Every
/// holder calls [`RefCount::release`] exactly once; the call that drops the
/// count to zero returns `true`, and that caller alone frees the node.
pub struct RefCount {
    count: AtomicUsize,
}

impl RefCount {
    /// Creates a counter with `count` outstanding references.
    #[inline]
    pub const fn new(count: usize) -> Self {
        Self {
            count: AtomicUsize::new(count),
        }
    }

    /// Current count, for diagnostics only.
    ///
    /// The value may be stale by the time the caller looks at it.
    #[inline]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Drops one reference; returns `true` if this was the last.
    ///
    /// The decrement is release-ordered so every access the holder made to
    /// the node happens-before the deallocation; the final release takes an
    /// acquire fence before reporting `true`.
    #[inline]
    pub fn release(&self) -> bool {
        let prev = self.count.fetch_sub(1, Ordering::Release);
        debug_assert!(prev != 0, "reference count underflow");
        if prev == 1 {
            fence(Ordering::Acquire);
            true
        } else {
            false
        }
    }
}

impl core::fmt::Debug for RefCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RefCount({})", self.count())
    }
}
