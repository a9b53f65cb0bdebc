use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::Ordering;

use crate::utils::CacheAligned;
use petek::{AtomicTagPtr, RefCount, TagPtr};

/// A linked-list cell owned by the queue.
///
/// Every reachable node has exactly two logical holders over its lifetime:
/// the queue structure itself (as head, tail, or an interior link) and the
/// one pop that reads its payload. Each holder releases once; the release
/// that drops the count to zero frees the node.
struct Node<T> {
    /// Shared-ownership count governing deallocation.
    refs: RefCount,

    /// Versioned link to the successor node.
    next: AtomicTagPtr<Node<T>>,

    /// The payload, written at allocation and moved out by the winning pop.
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Node<T> {
    fn alloc(value: T) -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            refs: RefCount::new(2),
            next: AtomicTagPtr::null(),
            value: UnsafeCell::new(MaybeUninit::new(value)),
        }))
    }

    /// A sentinel's payload is never written or read, so it carries only
    /// the structural reference.
    fn sentinel() -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            refs: RefCount::new(1),
            next: AtomicTagPtr::null(),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }))
    }
}

/// An unbounded multi-producer multi-consumer queue.
///
/// A linked FIFO in the Michael–Scott family. The queue always holds at
/// least one sentinel node whose payload has already been consumed; real
/// data lives in the nodes reachable from `head`'s successor onward, and
/// the queue is empty exactly when `head` and `tail` address the same node
/// and its link is null.
///
/// Both operations are lock-free but not wait-free: an individual thread
/// can retry arbitrarily under contention, while some thread always makes
/// progress system-wide.
pub struct LinkedQueue<T> {
    /// Versioned pointer to the sentinel / last-consumed node.
    head: CacheAligned<AtomicTagPtr<Node<T>>>,

    /// Versioned pointer to the last linked node, possibly one behind.
    tail: CacheAligned<AtomicTagPtr<Node<T>>>,
}

unsafe impl<T: Send> Send for LinkedQueue<T> {}
unsafe impl<T: Send> Sync for LinkedQueue<T> {}

impl<T> Default for LinkedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedQueue<T> {
    /// Creates a new unbounded queue.
    pub fn new() -> LinkedQueue<T> {
        let sentinel = Node::sentinel();
        LinkedQueue {
            head: CacheAligned::new(AtomicTagPtr::new(TagPtr::new(sentinel, 0))),
            tail: CacheAligned::new(AtomicTagPtr::new(TagPtr::new(sentinel, 0))),
        }
    }

    /// Pushes an element into the queue.
    ///
    /// Never fails and never blocks; growth is bounded only by memory.
    pub fn push(&self, value: T) {
        let node = Node::alloc(value);
        let mut node_ptr = TagPtr::new(node, 0);

        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let tail_ref = unsafe { tail.deref() };
            let next = tail_ref.next.load(Ordering::Acquire);

            // Snapshot consistency: tail must not have moved between the
            // two loads above.
            if !tail.same_addr(&self.tail.load(Ordering::Acquire)) {
                continue;
            }

            if !next.is_null() {
                // A link already landed past our tail capture but tail was
                // not advanced yet; help the straggler and retry.
                let _ = self
                    .tail
                    .compare_exchange(tail, next, Ordering::SeqCst, Ordering::Relaxed);
                continue;
            }

            // Stamp the next generation of this link site, both on the
            // pointer being installed and on the new node's own link so the
            // versions at each site stay monotonic.
            let version = next.version().wrapping_add(1);
            node_ptr.set_version(version);
            let mut link = TagPtr::null();
            link.set_version(version);
            unsafe { (*node).next.store(link, Ordering::Relaxed) };

            // Only one producer's CAS can win per generation of this link.
            if tail_ref
                .next
                .compare_exchange(next, node_ptr, Ordering::SeqCst, Ordering::Relaxed)
                .is_err()
            {
                continue;
            }

            // The push is logically complete; failure to advance tail just
            // means another thread already did it on our behalf.
            let _ = self
                .tail
                .compare_exchange(tail, node_ptr, Ordering::SeqCst, Ordering::Relaxed);
            return;
        }
    }

    /// Pops an element from the queue.
    ///
    /// Returns `None` immediately if the queue is empty.
    pub fn pop(&self) -> Option<T> {
        loop {
            let head = self.head.load(Ordering::Acquire);
            let tail = self.tail.load(Ordering::Acquire);
            let head_ref = unsafe { head.deref() };
            let mut next = head_ref.next.load(Ordering::Acquire);

            if !head.same_addr(&self.head.load(Ordering::Acquire)) {
                continue;
            }

            if head.same_addr(&tail) {
                if next.is_null() {
                    return None;
                }
                // Tail lags behind a completed link; help it and retry.
                let _ = self
                    .tail
                    .compare_exchange(tail, next, Ordering::SeqCst, Ordering::Relaxed);
                continue;
            }

            if next.is_null() {
                // Torn snapshot: head advanced between the loads.
                continue;
            }

            // Stamp the generation the head slot will carry next, then try
            // to advance head to the successor.
            next.upgrade();
            if self
                .head
                .compare_exchange(head, next, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                let next_ptr = next.as_raw();
                let head_ptr = head.as_raw();
                unsafe {
                    let value = (*next_ptr).value.get().read().assume_init();
                    // Done reading the payload.
                    if (*next_ptr).refs.release() {
                        drop(Box::from_raw(next_ptr));
                    }
                    // The old head is no longer reachable from the queue.
                    if (*head_ptr).refs.release() {
                        drop(Box::from_raw(head_ptr));
                    }
                    return Some(value);
                }
            }
        }
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        let next = unsafe { head.deref() }.next.load(Ordering::Acquire);
        head.same_addr(&tail) && next.is_null()
    }
}

impl<T> Drop for LinkedQueue<T> {
    fn drop(&mut self) {
        while self.pop().is_some() {}

        // Only the sentinel remains; dropping its structural reference
        // must free it.
        let head = self.head.load(Ordering::Relaxed);
        let ptr = head.as_raw();
        unsafe {
            let freed = (*ptr).refs.release();
            debug_assert!(freed, "sentinel must hold the last reference at drop");
            if freed {
                drop(Box::from_raw(ptr));
            }
        }
    }
}
