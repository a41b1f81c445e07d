//! A segregated free-list heap allocator over an externally supplied memory
//! region.
//!
//! This crate implements the allocation engine only: header/footer boundary
//! tags, twelve segregated free-list size classes, first-fit placement with
//! splitting, eager boundary-tag coalescing, and in-place `realloc` fast
//! paths. It never talks to the operating system itself — every byte it
//! manages comes from a [`HeapProvider`] the embedder supplies, mirroring a
//! `mem_sbrk`-style memory library rather than a syscall-backed heap.
//!
//! # Example
//!
//! ```
//! use seg_alloc::{SegHeap, provider::VecHeapProvider};
//!
//! let provider = VecHeapProvider::with_capacity(1 << 20);
//! let mut heap = SegHeap::init(provider).expect("provider has room for the initial chunk");
//!
//! let block = heap.allocate(64).expect("allocation succeeds");
//! heap.free(Some(block));
//! ```
//!
//! # Concurrency
//!
//! [`SegHeap`] is not thread-safe and carries no internal locking; callers
//! who need to share one across threads must synchronize externally, or
//! enable the `global-alloc-adapter` feature for a spinlock-wrapped
//! [`GlobalAlloc`](core::alloc::GlobalAlloc) implementation.

#![cfg_attr(not(any(test, doctest)), no_std)]

#[cfg(any(test, doctest))]
extern crate alloc;

mod check;
mod coalesce;
mod error;
mod free_list;
mod heap;
mod placement;
pub mod provider;
mod tag;

#[cfg(feature = "global-alloc-adapter")]
pub mod global;
#[cfg(feature = "global-alloc-adapter")]
mod spin;

pub use check::check_heap;
pub use error::InitError;
pub use heap::SegHeap;
pub use provider::HeapProvider;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::VecHeapProvider;

    fn fresh_heap(capacity: usize) -> SegHeap<VecHeapProvider> {
        let provider = VecHeapProvider::with_capacity(capacity);
        SegHeap::init(provider).expect("fresh provider has room for init")
    }

    #[test]
    fn init_produces_a_clean_heap() {
        let heap = fresh_heap(1 << 16);
        assert_eq!(check_heap(&heap), 0);
    }

    #[test]
    fn allocate_then_free_returns_clean_heap() {
        let mut heap = fresh_heap(1 << 16);
        let a = heap.allocate(128).expect("allocation succeeds");
        let b = heap.allocate(256).expect("allocation succeeds");
        assert_ne!(a, b);
        heap.free(Some(a));
        heap.free(Some(b));
        assert_eq!(check_heap(&heap), 0);
    }

    #[test]
    fn allocate_zero_returns_none() {
        let mut heap = fresh_heap(1 << 16);
        assert!(heap.allocate(0).is_none());
    }

    #[test]
    fn free_of_none_is_a_no_op() {
        let mut heap = fresh_heap(1 << 16);
        heap.free(None);
        assert_eq!(check_heap(&heap), 0);
    }

    #[test]
    fn coalescing_reclaims_a_contiguous_run() {
        let mut heap = fresh_heap(1 << 16);
        let blocks: alloc::vec::Vec<_> = (0..8)
            .map(|_| heap.allocate(64).expect("allocation succeeds"))
            .collect();
        for b in blocks {
            heap.free(Some(b));
        }
        assert_eq!(check_heap(&heap), 0);

        // A single large allocation should now be satisfiable without the
        // heap having to grow, since all neighbours merged into one block.
        let big = heap.allocate(8 * 64).expect("coalesced block satisfies this");
        heap.free(Some(big));
    }

    #[test]
    fn reallocate_grow_in_place_when_next_is_free() {
        let mut heap = fresh_heap(1 << 16);
        let a = heap.allocate(64).expect("allocation succeeds");
        let b = heap.allocate(64).expect("allocation succeeds");
        heap.free(Some(b));

        let grown = heap
            .reallocate(Some(a), 96)
            .expect("grow absorbs the freed neighbour");
        assert_eq!(grown, a);
        assert_eq!(check_heap(&heap), 0);
    }

    #[test]
    fn reallocate_shrink_in_place() {
        let mut heap = fresh_heap(1 << 16);
        let a = heap.allocate(512).expect("allocation succeeds");
        let shrunk = heap
            .reallocate(Some(a), 16)
            .expect("shrink always succeeds in place");
        assert_eq!(shrunk, a);
        assert_eq!(check_heap(&heap), 0);
    }

    #[test]
    fn reallocate_size_zero_frees() {
        let mut heap = fresh_heap(1 << 16);
        let a = heap.allocate(64).expect("allocation succeeds");
        assert!(heap.reallocate(Some(a), 0).is_none());
        assert_eq!(check_heap(&heap), 0);
    }

    #[test]
    fn reallocate_none_pointer_allocates() {
        let mut heap = fresh_heap(1 << 16);
        let a = heap.reallocate(None, 64).expect("acts like allocate");
        heap.free(Some(a));
    }

    #[test]
    fn allocator_extends_the_heap_under_pressure() {
        let mut heap = fresh_heap(1 << 20);
        let blocks: alloc::vec::Vec<_> = (0..200)
            .map(|_| heap.allocate(256).expect("allocation succeeds"))
            .collect();
        assert_eq!(check_heap(&heap), 0);
        for b in blocks {
            heap.free(Some(b));
        }
        assert_eq!(check_heap(&heap), 0);
    }
}
