//! Lock-free multi-producer multi-consumer FIFO queues.
//!
//! Two alternative implementations of the same two-operation contract:
//!
//! - `ArrayQueue`: bounded MPMC queue over a fixed ring of slots, each slot
//!   carrying per-cycle sequence stamps. Rejects pushes when full.
//! - `LinkedQueue`: unbounded MPMC queue over a linked list with versioned
//!   head/tail pointers and reference-counted nodes. Pushes always succeed.
//!
//! Both are lock-free: no operation blocks, `pop` on an empty queue and a
//! bounded `push` on a full queue return immediately, and internal CAS
//! races are retried without ever surfacing to the caller.
//!
//! ## Usage
//!
//! ```rust
//! use petek_queue::array_queue::ArrayQueue;
//! use petek_queue::linked_queue::LinkedQueue;
//!
//! let bounded = ArrayQueue::new(8);
//! assert!(bounded.push(1).is_ok());
//! assert_eq!(bounded.pop(), Some(1));
//!
//! let unbounded = LinkedQueue::new();
//! unbounded.push(2);
//! assert_eq!(unbounded.pop(), Some(2));
//! assert_eq!(unbounded.pop(), None);
//! ```

pub mod array_queue;
pub mod linked_queue;
pub mod utils;
