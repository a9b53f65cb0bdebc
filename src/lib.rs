//! Petek: versioned-pointer memory reclamation for lock-free data structures.
//! ABA-safe single-word CAS, deterministic deallocation.
//!
//! Petek packs a 16-bit version counter into the unused high bits of a
//! pointer word so that a compare-and-swap can distinguish two lives of the
//! same address, and pairs that with an embedded per-node reference count
//! that decides when an unlinked node may actually be freed.
//!
//! # Key Features
//!
//! - **Single-Word CAS**: address and generation travel together in one `u64`
//! - **ABA Detection**: a stale witness fails the exchange even if the
//!   address was recycled
//! - **Embedded Reference Counts**: nodes carry their own release protocol,
//!   no global epochs or hazard lists
//! - **Zero Dependencies**: `core` atomics only
//!
//! # Example
//!
//! ```rust
//! use petek::{AtomicTagPtr, TagPtr};
//! use std::sync::atomic::Ordering;
//!
//! let node = Box::into_raw(Box::new(42u64));
//! let slot = AtomicTagPtr::new(TagPtr::new(node, 0));
//!
//! // A stale witness no longer matches once the slot moves a generation.
//! let stale = slot.load(Ordering::Acquire);
//! let mut next = stale;
//! next.upgrade();
//! slot.store(next, Ordering::Release);
//! assert!(slot
//!     .compare_exchange(stale, TagPtr::null(), Ordering::SeqCst, Ordering::Acquire)
//!     .is_err());
//!
//! unsafe { drop(Box::from_raw(node)) };
//! ```

#![warn(missing_docs)]

mod count;
mod tagged;

pub use count::RefCount;
pub use tagged::{AtomicTagPtr, TagPtr};

// Re-export for convenience
pub use core::sync::atomic::Ordering;
