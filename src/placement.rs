//! # Placement engine
//!
//! Turns a caller byte request into an adjusted block size, searches the
//! segregated bins for the first block large enough to hold it, and splits
//! the chosen block when the remainder is itself a usable free block.

use crate::free_list::{self, Bins};
use crate::tag::{self, ALIGN, MIN_BLOCK, WORD};

/// Compute the block size (header + payload + footer) needed for a caller
/// request of `size` bytes.
///
/// Requests at or below two words always round up to [`MIN_BLOCK`] (the
/// link area dominates); larger requests round their payload up to a word
/// multiple and add the header/footer overhead, then round the whole block
/// up to [`ALIGN`] so every block size stays a double-word multiple.
pub(crate) const fn adjust_size(size: usize) -> usize {
    let raw = if size <= 2 * WORD {
        MIN_BLOCK
    } else {
        tag::round_up(size, WORD) + 2 * WORD
    };
    tag::round_up(raw, ALIGN)
}

/// Search the bins, starting at `asize`'s own class and walking upward,
/// for the first free block whose size is at least `asize`.
///
/// # Safety
/// The bin table must describe a heap that is still live.
pub(crate) unsafe fn find_fit(bins: &Bins, asize: usize) -> Option<*mut u8> {
    for k in free_list::bin_of(asize)..free_list::NUM_BINS {
        let mut cur = bins[k];
        while !cur.is_null() {
            if unsafe { tag::size_of_block(cur) } >= asize {
                return Some(cur);
            }
            cur = unsafe { free_list::next(cur) };
        }
    }
    None
}

/// Remove the free block `bp` (of size `csize >= asize`) from its bin and
/// place an allocated block of `asize` bytes at its start, splitting off a
/// free remainder when the leftover is at least [`MIN_BLOCK`].
///
/// # Safety
/// `bp` must be a free block of size `csize` currently linked into its bin.
pub(crate) unsafe fn place(bins: &mut Bins, bp: *mut u8, asize: usize) {
    unsafe {
        let csize = tag::size_of_block(bp);
        free_list::list_remove(bins, bp, csize);

        if csize - asize >= MIN_BLOCK {
            tag::set_tag(bp, asize, true);
            let remainder = tag::next_block(bp);
            tag::set_tag(remainder, csize - asize, false);
            free_list::list_insert(bins, remainder, csize - asize);
        } else {
            tag::set_tag(bp, csize, true);
        }
    }
}
