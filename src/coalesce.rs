//! # Boundary-tag coalescer
//!
//! Eagerly merges a newly freed block with its address-adjacent neighbours,
//! using the four boundary-tag cases. The prologue and epilogue sentinels
//! are always allocated, so the neighbour lookups below never need special
//! casing at the ends of the heap.

use crate::free_list::{self, Bins};
use crate::tag;

/// Merge free block `bp` with any free neighbours, updating bin membership.
///
/// `bp` must already be tagged free and inserted into its bin before this
/// is called; returns the payload pointer of the (possibly merged) block.
///
/// # Safety
/// `bp` must be a free block currently linked into the bin matching its
/// current size, with valid prologue/epilogue sentinels bounding the heap.
pub(crate) unsafe fn coalesce(bins: &mut Bins, bp: *mut u8) -> *mut u8 {
    unsafe {
        let size = tag::size_of_block(bp);
        let prev = tag::prev_block(bp);
        let next = tag::next_block(bp);
        let prev_alloc = tag::is_allocated(prev);
        let next_alloc = tag::is_allocated(next);

        match (prev_alloc, next_alloc) {
            (true, true) => bp,
            (true, false) => {
                let next_size = tag::size_of_block(next);
                free_list::list_remove(bins, bp, size);
                free_list::list_remove(bins, next, next_size);
                let merged_size = size + next_size;
                tag::set_tag(bp, merged_size, false);
                free_list::list_insert(bins, bp, merged_size);
                bp
            }
            (false, true) => {
                let prev_size = tag::size_of_block(prev);
                free_list::list_remove(bins, bp, size);
                free_list::list_remove(bins, prev, prev_size);
                let merged_size = size + prev_size;
                tag::set_tag(prev, merged_size, false);
                free_list::list_insert(bins, prev, merged_size);
                prev
            }
            (false, false) => {
                let prev_size = tag::size_of_block(prev);
                let next_size = tag::size_of_block(next);
                free_list::list_remove(bins, bp, size);
                free_list::list_remove(bins, prev, prev_size);
                free_list::list_remove(bins, next, next_size);
                let merged_size = size + prev_size + next_size;
                tag::set_tag(prev, merged_size, false);
                free_list::list_insert(bins, prev, merged_size);
                prev
            }
        }
    }
}
