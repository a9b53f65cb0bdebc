//! Tagged pointer types for ABA-safe atomic updates
//!
//! This module provides `TagPtr<T>`, a pointer word carrying a 16-bit
//! version counter, and `AtomicTagPtr<T>`, its atomic container. The
//! version increments on every reuse of an address at a given write site,
//! so a compare-and-swap holding a stale witness fails even when the
//! address itself has been recycled.

use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, Ordering};

/// Low bits of the packed word holding the address.
///
/// Current 64-bit hardware translates at most 48 virtual address bits, so
/// the top 16 bits of a user-space pointer are free to carry the version.
const ADDR_BITS: u32 = 48;

/// Mask selecting the address bits of a packed word.
const ADDR_MASK: u64 = (1u64 << ADDR_BITS) - 1;

/// A pointer packed together with a 16-bit version counter.
///
/// This is a plain value type: all mutation is local to the caller's copy,
/// and visibility comes from the [`AtomicTagPtr`] the value is stored in.
/// Two tagged pointers are the *same logical generation* only when both
/// address and version match (`==`); [`TagPtr::same_addr`] is the weaker,
/// address-only comparison used to check whether a slot moved at all.
///
/// # Examples
///
/// ```ignore
/// use petek::TagPtr;
///
/// let node = Box::into_raw(Box::new(7));
/// let mut ptr = TagPtr::new(node, 0);
/// ptr.upgrade();
/// assert_eq!(ptr.version(), 1);
/// assert_eq!(ptr.as_raw(), node);
/// ```
pub struct TagPtr<T> {
    bits: u64,
    _marker: PhantomData<*mut T>,
}

impl<T> TagPtr<T> {
    /// Packs a raw pointer and a version into one word.
    ///
    /// Debug builds assert that the address fits in 48 bits.
    #[inline]
    pub fn new(ptr: *mut T, version: u16) -> Self {
        let addr = ptr as u64;
        debug_assert_eq!(addr & !ADDR_MASK, 0, "address exceeds 48 bits");
        Self {
            bits: (addr & ADDR_MASK) | ((version as u64) << ADDR_BITS),
            _marker: PhantomData,
        }
    }

    /// The null tagged pointer at version 0.
    #[inline]
    pub const fn null() -> Self {
        Self {
            bits: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the address bits as a raw pointer.
    #[inline]
    pub fn as_raw(&self) -> *mut T {
        (self.bits & ADDR_MASK) as *mut T
    }

    /// Returns true if the address bits are zero, whatever the version.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.bits & ADDR_MASK == 0
    }

    /// Returns the version counter.
    #[inline]
    pub fn version(&self) -> u16 {
        (self.bits >> ADDR_BITS) as u16
    }

    /// Replaces the version, keeping the address.
    #[inline]
    pub fn set_version(&mut self, version: u16) {
        self.bits = (self.bits & ADDR_MASK) | ((version as u64) << ADDR_BITS);
    }

    /// Advances the version by one generation (wrapping).
    ///
    /// Used right after a CAS target advances, to stamp the value that will
    /// be installed next at the same write site.
    #[inline]
    pub fn upgrade(&mut self) {
        self.set_version(self.version().wrapping_add(1));
    }

    /// Address-only equality: did the slot move, ignoring generations.
    ///
    /// Full `==` additionally requires matching versions.
    #[inline]
    pub fn same_addr(&self, other: &Self) -> bool {
        self.bits & ADDR_MASK == other.bits & ADDR_MASK
    }

    /// Converts to an optional reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure the address points to a live value of type
    /// `T` for the chosen lifetime; the version carries no such guarantee
    /// by itself.
    #[inline]
    pub unsafe fn as_ref<'a>(&self) -> Option<&'a T> {
        let ptr = self.as_raw();
        if ptr.is_null() {
            None
        } else {
            // SAFETY: caller guarantees pointer validity
            unsafe { Some(&*ptr) }
        }
    }

    /// Converts to a reference without checking for null.
    ///
    /// # Safety
    ///
    /// The address must be non-null and point to a live value of type `T`
    /// for the chosen lifetime.
    #[inline]
    pub unsafe fn deref<'a>(&self) -> &'a T {
        // SAFETY: caller guarantees pointer is non-null and valid
        unsafe { &*self.as_raw() }
    }

    #[inline]
    pub(crate) fn from_bits(bits: u64) -> Self {
        Self {
            bits,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn into_bits(self) -> u64 {
        self.bits
    }
}

impl<T> Clone for TagPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TagPtr<T> {}

impl<T> PartialEq for TagPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<T> Eq for TagPtr<T> {}

impl<T> Default for TagPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for TagPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagPtr({:p}, v{})", self.as_raw(), self.version())
    }
}

/// An atomic slot holding a [`TagPtr`].
///
/// The packed word makes address and version the subject of one atomic
/// operation, which is what defeats the ABA problem: a witness captured
/// before an address was recycled carries the old version and no longer
/// matches.
///
/// # Examples
///
/// ```ignore
/// use petek::{AtomicTagPtr, TagPtr};
/// use std::sync::atomic::Ordering;
///
/// let slot = AtomicTagPtr::new(TagPtr::new(node, 0));
/// let current = slot.load(Ordering::Acquire);
/// ```
pub struct AtomicTagPtr<T> {
    data: AtomicU64,
    _marker: PhantomData<*mut T>,
}

unsafe impl<T: Send + Sync> Send for AtomicTagPtr<T> {}
unsafe impl<T: Send + Sync> Sync for AtomicTagPtr<T> {}

impl<T> AtomicTagPtr<T> {
    /// Creates a new atomic slot holding `ptr`.
    #[inline]
    pub fn new(ptr: TagPtr<T>) -> Self {
        Self {
            data: AtomicU64::new(ptr.into_bits()),
            _marker: PhantomData,
        }
    }

    /// Creates a slot holding the null tagged pointer.
    #[inline]
    pub const fn null() -> Self {
        Self {
            data: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    /// Loads the current tagged pointer.
    #[inline]
    pub fn load(&self, order: Ordering) -> TagPtr<T> {
        TagPtr::from_bits(self.data.load(order))
    }

    /// Stores a tagged pointer into the slot.
    #[inline]
    pub fn store(&self, ptr: TagPtr<T>, order: Ordering) {
        self.data.store(ptr.into_bits(), order);
    }

    /// Compares and exchanges the full word, address and version together.
    ///
    /// Returns the witnessed value on failure, like the standard atomics.
    #[inline]
    pub fn compare_exchange(
        &self,
        current: TagPtr<T>,
        new: TagPtr<T>,
        success: Ordering,
        failure: Ordering,
    ) -> Result<TagPtr<T>, TagPtr<T>> {
        match self
            .data
            .compare_exchange(current.into_bits(), new.into_bits(), success, failure)
        {
            Ok(prev) => Ok(TagPtr::from_bits(prev)),
            Err(prev) => Err(TagPtr::from_bits(prev)),
        }
    }

    /// Compares and exchanges the full word (weak version).
    ///
    /// This version may spuriously fail even when the comparison succeeds.
    #[inline]
    pub fn compare_exchange_weak(
        &self,
        current: TagPtr<T>,
        new: TagPtr<T>,
        success: Ordering,
        failure: Ordering,
    ) -> Result<TagPtr<T>, TagPtr<T>> {
        match self.data.compare_exchange_weak(
            current.into_bits(),
            new.into_bits(),
            success,
            failure,
        ) {
            Ok(prev) => Ok(TagPtr::from_bits(prev)),
            Err(prev) => Err(TagPtr::from_bits(prev)),
        }
    }
}

impl<T> Default for AtomicTagPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}
