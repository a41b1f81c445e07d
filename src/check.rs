//! # Heap consistency checker
//!
//! A debugging oracle, not a correctness dependency: walks the block chain
//! and the bin tables independently and reports every boundary-tag and
//! bin-membership invariant it can find broken, rather than stopping at the
//! first one. Intended to run under `debug_assertions` or from tests, not
//! on every allocation in a release build.

use crate::free_list::{self, Bins};
use crate::heap::SegHeap;
use crate::provider::HeapProvider;
use crate::tag;

/// Walk the heap and its bins, logging every invariant violation found.
///
/// Returns the number of violations. A clean heap returns `0`.
pub fn check_heap<P: HeapProvider>(heap: &SegHeap<P>) -> usize {
    let mut violations = 0;
    violations += check_block_chain(heap);
    violations += check_bins(heap);
    violations
}

fn check_block_chain<P: HeapProvider>(heap: &SegHeap<P>) -> usize {
    let mut violations = 0;
    let lo = heap.provider().heap_lo();
    let hi = heap.provider().heap_hi();

    // The first real block starts one word past the heap's base address
    // (the alignment pad), and is the prologue.
    let mut bp = unsafe { lo.add(2 * tag::WORD).cast_mut() };
    let mut saw_prologue = false;

    loop {
        let header_addr = unsafe { tag::header(bp) };
        if (header_addr as usize) >= (hi as usize) {
            log::warn!("block chain ran past heap_hi without reaching the epilogue");
            violations += 1;
            break;
        }

        let size = unsafe { tag::size_of_block(bp) };
        let alloc = unsafe { tag::is_allocated(bp) };

        if size == 0 {
            // Epilogue reached; it must be marked allocated.
            if !alloc {
                log::warn!("epilogue header is not marked allocated");
                violations += 1;
            }
            break;
        }

        if size % tag::ALIGN != 0 {
            log::warn!("block at {bp:p} has misaligned size {size}");
            violations += 1;
        }
        if size < tag::MIN_BLOCK && !saw_prologue {
            // The prologue is the one legal sub-minimum block (header+footer only).
        } else if size < tag::MIN_BLOCK {
            log::warn!("block at {bp:p} is smaller than the minimum block size");
            violations += 1;
        }

        let footer_tag = unsafe { tag::footer_for(bp, size).cast::<usize>().read() };
        if size != (footer_tag & !(tag::ALIGN - 1)) {
            log::warn!("block at {bp:p} has mismatched header/footer size");
            violations += 1;
        }

        if !saw_prologue {
            if size != 2 * tag::WORD || !alloc {
                log::warn!("heap does not begin with a well-formed prologue block");
                violations += 1;
            }
            saw_prologue = true;
        } else if !alloc {
            // Two adjacent free blocks would have survived a coalesce pass.
            let next = unsafe { tag::next_block(bp) };
            if !unsafe { tag::is_allocated(next) } {
                log::warn!("adjacent free blocks at {bp:p} and {next:p} were not coalesced");
                violations += 1;
            }
        }

        bp = unsafe { tag::next_block(bp) };
    }

    if !saw_prologue {
        log::warn!("heap has no blocks at all");
        violations += 1;
    }
    violations
}

fn check_bins<P: HeapProvider>(heap: &SegHeap<P>) -> usize {
    let mut violations = 0;
    let bins: &Bins = heap.bins();

    for k in 0..free_list::NUM_BINS {
        unsafe {
            free_list::for_each_in_bin(bins, k, |bp| {
                if unsafe { tag::is_allocated(bp) } {
                    log::warn!("allocated block at {bp:p} found on free bin {k}");
                    violations += 1;
                }
                let size = unsafe { tag::size_of_block(bp) };
                if free_list::bin_of(size) != k {
                    log::warn!(
                        "block at {bp:p} of size {size} is linked into bin {k}, expected {}",
                        free_list::bin_of(size)
                    );
                    violations += 1;
                }
            });
        }
    }
    violations
}
