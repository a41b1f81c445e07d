//! # Heap provider
//!
//! The allocator engine never talks to the operating system directly; it
//! only ever asks a [`HeapProvider`] to extend a single, contiguous,
//! grow-only region. This mirrors the memory-library boundary the engine
//! was designed against: a single "extend by n bytes" call plus a handful
//! of read-only queries, with everything else (how pages are obtained, how
//! the region is mapped) left to the embedder.

use core::ptr::NonNull;

/// External collaborator that owns the address range the engine manages.
///
/// Implementations are expected to hand back contiguous, monotonically
/// increasing memory: each successful `request` extends the region
/// immediately past the end of the previous one.
pub trait HeapProvider {
    /// Error returned when the provider cannot satisfy a `request`.
    type Error: core::fmt::Debug;

    /// Extend the managed region by exactly `n` bytes, returning the address
    /// of the first new byte.
    fn request(&mut self, n: usize) -> Result<NonNull<u8>, Self::Error>;

    /// Lowest address currently owned by the allocator.
    fn heap_lo(&self) -> *const u8;

    /// Address of the last byte currently owned by the allocator.
    fn heap_hi(&self) -> *const u8;

    /// Number of bytes currently owned by the allocator.
    fn heap_size(&self) -> usize;

    /// Informational page size of the underlying platform.
    fn page_size(&self) -> usize;
}

/// A [`HeapProvider`] backed by a single fixed-capacity buffer, allocated
/// once up front so that addresses handed out never move.
///
/// This is the crate's stand-in for the real memory library: exactly the
/// role a simulated `mem_sbrk`-style heap plays in exercising the engine
/// without a real operating system underneath it. It is only available on
/// `std`/test builds; freestanding embedders supply their own
/// [`HeapProvider`] backed by real memory.
#[cfg(any(test, doctest))]
pub struct VecHeapProvider {
    storage: alloc::boxed::Box<[u8]>,
    used: usize,
    page_size: usize,
}

#[cfg(any(test, doctest))]
impl VecHeapProvider {
    /// Reserve `capacity` bytes of backing storage up front.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: alloc::vec![0u8; capacity].into_boxed_slice(),
            used: 0,
            page_size: 4096,
        }
    }
}

#[cfg(any(test, doctest))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VecHeapProviderError {
    /// The fixed-capacity backing buffer has been exhausted.
    #[error("simulated heap exhausted: requested {requested} bytes, {available} available")]
    Exhausted { requested: usize, available: usize },
}

#[cfg(any(test, doctest))]
impl HeapProvider for VecHeapProvider {
    type Error = VecHeapProviderError;

    fn request(&mut self, n: usize) -> Result<NonNull<u8>, Self::Error> {
        let available = self.storage.len() - self.used;
        if n > available {
            return Err(VecHeapProviderError::Exhausted {
                requested: n,
                available,
            });
        }
        let ptr = unsafe { self.storage.as_mut_ptr().add(self.used) };
        self.used += n;
        Ok(NonNull::new(ptr).expect("backing storage pointer is never null"))
    }

    fn heap_lo(&self) -> *const u8 {
        self.storage.as_ptr()
    }

    fn heap_hi(&self) -> *const u8 {
        unsafe { self.storage.as_ptr().add(self.used.saturating_sub(1)) }
    }

    fn heap_size(&self) -> usize {
        self.used
    }

    fn page_size(&self) -> usize {
        self.page_size
    }
}
