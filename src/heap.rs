//! # Heap initializer/extender and public operations
//!
//! [`SegHeap`] owns the segregated bin table and a [`HeapProvider`]. It
//! primes the heap with prologue/epilogue sentinels, grows it on demand,
//! and implements the public `allocate`/`free`/`reallocate` surface,
//! including reallocate's in-place shrink/grow fast paths.

use core::ptr::NonNull;

use crate::coalesce;
use crate::error::InitError;
use crate::free_list::{self, Bins};
use crate::placement;
use crate::provider::HeapProvider;
use crate::tag::{self, ALIGN, MIN_BLOCK, WORD};

/// Default amount (bytes) to extend the heap by when a request misses.
const CHUNK: usize = 4096;

/// A segregated free-list allocator over a single grow-only heap region.
///
/// See the crate root documentation for the full design. `P` is the
/// [`HeapProvider`] this instance draws memory from.
pub struct SegHeap<P: HeapProvider> {
    provider: P,
    bins: Bins,
}

impl<P: HeapProvider> SegHeap<P> {
    /// Initialize a fresh heap: writes the prologue/epilogue sentinels and
    /// extends by one [`CHUNK`] of free space.
    ///
    /// Must be called exactly once per `provider` before any other
    /// operation.
    pub fn init(mut provider: P) -> Result<Self, InitError<P::Error>> {
        // One alignment pad word + prologue header + prologue footer +
        // epilogue header. Bin heads live outside the heap (see crate docs),
        // so this is the entire fixed overhead.
        let base = provider
            .request(4 * WORD)
            .map_err(InitError::ProviderRejected)?
            .as_ptr();

        unsafe {
            // idx0: alignment pad (never read).
            core::ptr::write_bytes(base, 0, WORD);

            let prologue_header = base.add(WORD);
            let prologue_bp = prologue_header.add(WORD);
            tag::set_tag(prologue_bp, 2 * WORD, true);

            let epilogue_header = prologue_bp.add(2 * WORD).sub(WORD);
            epilogue_header
                .cast::<usize>()
                .write(tag::pack(0, true));
        }

        let mut heap = Self {
            provider,
            bins: free_list::empty_bins(),
        };

        heap.extend(CHUNK)
            .map_err(InitError::InitialExtendFailed)?;

        Ok(heap)
    }

    /// Extend the heap by at least `n` bytes, returning the payload pointer
    /// of the (possibly coalesced) new free block.
    fn extend(&mut self, n: usize) -> Result<*mut u8, P::Error> {
        let size = tag::round_up(tag::round_up(n, WORD), ALIGN);
        let bp = self.provider.request(size)?.as_ptr();

        unsafe {
            tag::set_tag(bp, size, false);
            let epilogue = tag::next_block(bp).sub(WORD);
            epilogue.cast::<usize>().write(tag::pack(0, true));
        }

        unsafe {
            free_list::list_insert(&mut self.bins, bp, size);
        }
        let merged = unsafe { coalesce::coalesce(&mut self.bins, bp) };
        Ok(merged)
    }

    /// Allocate a block with at least `size` bytes of payload.
    ///
    /// Returns `None` if `size == 0` or the heap provider cannot be
    /// extended further.
    pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        let asize = placement::adjust_size(size);

        if let Some(bp) = unsafe { placement::find_fit(&self.bins, asize) } {
            unsafe { placement::place(&mut self.bins, bp, asize) };
            return NonNull::new(bp);
        }

        let extend_size = asize.max(CHUNK);
        let bp = self.extend(extend_size).ok()?;
        // The just-extended region is guaranteed to hold at least `asize`
        // bytes, so placement here cannot fail.
        unsafe { placement::place(&mut self.bins, bp, asize) };
        NonNull::new(bp)
    }

    /// Free a previously allocated block. A `None` pointer is a silent no-op.
    pub fn free(&mut self, ptr: Option<NonNull<u8>>) {
        let Some(ptr) = ptr else { return };
        let bp = ptr.as_ptr();
        unsafe {
            let size = tag::size_of_block(bp);
            tag::set_tag(bp, size, false);
            free_list::list_insert(&mut self.bins, bp, size);
            coalesce::coalesce(&mut self.bins, bp);
        }
    }

    /// Resize a previously allocated block (or allocate/free, per the usual
    /// realloc conventions).
    ///
    /// - `size == 0` frees `ptr` and returns `None`.
    /// - `ptr == None` behaves like [`Self::allocate`].
    /// - Otherwise, shrink/grow is attempted in place first; only when that
    ///   is not possible does this fall back to allocate+copy+free. On
    ///   failure the original block at `ptr` is left untouched.
    pub fn reallocate(&mut self, ptr: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            self.free(ptr);
            return None;
        }
        let Some(ptr) = ptr else {
            return self.allocate(size);
        };

        let bp = ptr.as_ptr();
        let asize = placement::adjust_size(size);
        let old = unsafe { tag::size_of_block(bp) };

        if asize == old {
            return NonNull::new(bp);
        }

        if asize < old {
            return Some(self.shrink_in_place(bp, old, asize));
        }

        if let Some(grown) = self.grow_in_place(bp, old, asize) {
            return Some(grown);
        }

        // Generic path: allocate a new block, copy, free the old one. The
        // original block is left untouched if this fails.
        let new_ptr = self.allocate(size)?;
        unsafe {
            let copy_len = core::cmp::min(size, old - 2 * WORD);
            core::ptr::copy_nonoverlapping(bp, new_ptr.as_ptr(), copy_len);
        }
        self.free(Some(ptr));
        Some(new_ptr)
    }

    /// Shrink block `bp` from `old` to `asize` bytes, splitting off a free
    /// remainder when it is large enough to stand on its own.
    fn shrink_in_place(&mut self, bp: *mut u8, old: usize, asize: usize) -> NonNull<u8> {
        let delta = old - asize;
        if delta >= MIN_BLOCK {
            unsafe {
                tag::set_tag(bp, asize, true);
                let remainder = tag::next_block(bp);
                tag::set_tag(remainder, delta, false);
                free_list::list_insert(&mut self.bins, remainder, delta);
                coalesce::coalesce(&mut self.bins, remainder);
            }
        }
        // Below the threshold: keep the slack inside the block unchanged.
        NonNull::new(bp).expect("payload pointer is never null")
    }

    /// Try to grow block `bp` from `old` to `asize` bytes by absorbing all
    /// or part of its free successor. Returns `None` if the successor is
    /// allocated or too small, leaving `bp` untouched.
    fn grow_in_place(&mut self, bp: *mut u8, old: usize, asize: usize) -> Option<NonNull<u8>> {
        let need = asize - old;
        let next = unsafe { tag::next_block(bp) };
        if unsafe { tag::is_allocated(next) } {
            return None;
        }
        let next_size = unsafe { tag::size_of_block(next) };

        if next_size >= need + MIN_BLOCK {
            unsafe {
                free_list::list_remove(&mut self.bins, next, next_size);
                tag::set_tag(bp, asize, true);
                let remainder = tag::next_block(bp);
                tag::set_tag(remainder, next_size - need, false);
                free_list::list_insert(&mut self.bins, remainder, next_size - need);
            }
            return NonNull::new(bp);
        }

        if next_size >= need {
            unsafe {
                free_list::list_remove(&mut self.bins, next, next_size);
                tag::set_tag(bp, old + next_size, true);
            }
            return NonNull::new(bp);
        }

        None
    }

    /// The heap provider backing this allocator.
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    pub(crate) fn bins(&self) -> &Bins {
        &self.bins
    }
}
