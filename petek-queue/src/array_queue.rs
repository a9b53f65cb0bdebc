use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::utils::CacheAligned;

/// Stamp for a slot that has never been written.
///
/// Cursors count up from zero and never wrap, so no real cursor can equal
/// this value.
const INVALID_POS: usize = usize::MAX;

/// A slot in the ring.
///
/// `store_seq` is the producer-visible cycle stamp: a producer may write the
/// slot only while `store_seq` equals its tail capture. `read_seq` is the
/// consumer-visible stamp: a consumer may read only while `read_seq` equals
/// its head capture. Comparing stamps to cursors distinguishes full from
/// empty structurally, with no ambiguity when head and tail coincide.
struct Slot<T> {
    /// Cycle stamp gating the next write.
    store_seq: AtomicUsize,

    /// Cycle stamp publishing the last write.
    read_seq: AtomicUsize,

    /// The value in this slot.
    value: UnsafeCell<MaybeUninit<T>>,
}

/// A bounded multi-producer multi-consumer queue.
pub struct ArrayQueue<T> {
    /// The head of the queue (consumer cursor, never wrapped).
    head: CacheAligned<AtomicUsize>,

    /// The tail of the queue (producer cursor, never wrapped).
    tail: CacheAligned<AtomicUsize>,

    /// The buffer holding slots.
    buffer: Box<[Slot<T>]>,

    /// A mask for indices.
    mask: usize,
}

unsafe impl<T: Send> Send for ArrayQueue<T> {}
unsafe impl<T: Send> Sync for ArrayQueue<T> {}

impl<T> ArrayQueue<T> {
    /// Creates a new bounded queue with the given capacity.
    ///
    /// The capacity will be rounded up to the next power of two. Capacity 1
    /// is legal and degenerates to a single-slot rendezvous.
    pub fn new(cap: usize) -> ArrayQueue<T> {
        let capacity = if cap < 1 { 1 } else { cap.next_power_of_two() };
        let mut buffer = Vec::with_capacity(capacity);

        for i in 0..capacity {
            buffer.push(Slot {
                store_seq: AtomicUsize::new(i),
                read_seq: AtomicUsize::new(INVALID_POS),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            });
        }

        ArrayQueue {
            buffer: buffer.into_boxed_slice(),
            mask: capacity - 1,
            head: CacheAligned::new(AtomicUsize::new(0)),
            tail: CacheAligned::new(AtomicUsize::new(0)),
        }
    }

    /// Pushes an element into the queue.
    ///
    /// Returns `Err` with the rejected value if the queue is full. Full is
    /// decided from the slot stamp alone: if the slot at the tail has not
    /// cycled back to accept this generation's write, there is no point
    /// waiting for it.
    pub fn push(&self, value: T) -> Result<(), T> {
        let backoff = crossbeam_utils::Backoff::new();

        loop {
            let tail = self.tail.load(Ordering::Relaxed);
            let slot = &self.buffer[tail & self.mask];

            if slot.store_seq.load(Ordering::Acquire) != tail {
                return Err(value);
            }

            if self
                .tail
                .compare_exchange(tail, tail + 1, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                debug_assert_eq!(slot.store_seq.load(Ordering::Relaxed), tail);
                unsafe {
                    slot.value.get().write(MaybeUninit::new(value));
                }
                // Publish: the payload write above must be visible to any
                // consumer that observes this stamp.
                slot.read_seq.store(tail, Ordering::Release);
                return Ok(());
            }

            // Another producer claimed this slot.
            backoff.spin();
        }
    }

    /// Pops an element from the queue.
    ///
    /// Returns `None` immediately if the queue is empty.
    pub fn pop(&self) -> Option<T> {
        let backoff = crossbeam_utils::Backoff::new();

        loop {
            let head = self.head.load(Ordering::Relaxed);
            let slot = &self.buffer[head & self.mask];

            if slot.read_seq.load(Ordering::Acquire) != head {
                return None;
            }

            if self
                .head
                .compare_exchange(head, head + 1, Ordering::SeqCst, Ordering::Relaxed)
                .is_ok()
            {
                debug_assert_eq!(slot.read_seq.load(Ordering::Relaxed), head);
                let value = unsafe { slot.value.get().read().assume_init() };
                // Republish the slot for its next write cycle.
                slot.store_seq
                    .store(head + self.buffer.len(), Ordering::Release);
                return Some(value);
            }

            // Another consumer claimed this slot.
            backoff.spin();
        }
    }

    /// Returns the capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        let head = self.head.load(Ordering::SeqCst);
        let tail = self.tail.load(Ordering::SeqCst);
        head == tail
    }

    /// Returns `true` if the queue is full.
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::SeqCst);
        let tail = self.tail.load(Ordering::SeqCst);
        tail == head + self.buffer.len()
    }
}

impl<T> Drop for ArrayQueue<T> {
    fn drop(&mut self) {
        // Exclusive access: every claimed write has completed, so exactly
        // the cursors in [head, tail) hold live values.
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);

        for cursor in head..tail {
            let slot = &self.buffer[cursor & self.mask];
            unsafe {
                ptr::drop_in_place((*slot.value.get()).as_mut_ptr());
            }
        }
    }
}
