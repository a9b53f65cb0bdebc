use std::ops::{Deref, DerefMut};

// Cache line sizes per architecture.
// s390x: 256B; aarch64: 128B (Apple M-series / Neoverse); everything else: 64B.
// Head and tail cursors live on separate lines so producers and consumers
// don't invalidate each other's cache on every operation.

#[cfg(target_arch = "s390x")]
#[repr(align(256))]
#[derive(Copy, Clone, Default, Debug)]
pub struct CacheAligned<T> {
    pub data: T,
}

#[cfg(target_arch = "aarch64")]
#[repr(align(128))]
#[derive(Copy, Clone, Default, Debug)]
pub struct CacheAligned<T> {
    pub data: T,
}

#[cfg(not(any(target_arch = "s390x", target_arch = "aarch64")))]
#[repr(align(64))]
#[derive(Copy, Clone, Default, Debug)]
pub struct CacheAligned<T> {
    pub data: T,
}

impl<T> CacheAligned<T> {
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for CacheAligned<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}
