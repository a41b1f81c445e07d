//! # Segregated free-list index and linkage
//!
//! Free blocks are chained into one doubly linked, LIFO-ordered list per
//! size class ("bin"). The links are stored in the first two payload words
//! of the free block itself — this is why [`crate::tag::MIN_BLOCK`] is four
//! words, not a policy choice. Bin heads live outside the heap, as a plain
//! array owned by [`crate::SegHeap`] (see the crate's design notes on the
//! out-of-heap bin table).

use crate::tag::WORD;

/// Number of segregated size classes.
pub(crate) const NUM_BINS: usize = 12;

/// Sizes at or below this fall into bin 0; larger sizes double per bin.
const BIN_THRESHOLD: usize = 128;

pub(crate) type Bins = [*mut u8; NUM_BINS];

/// An empty bin table (all heads unset).
pub(crate) const fn empty_bins() -> Bins {
    [core::ptr::null_mut(); NUM_BINS]
}

/// Classify `size` into a bin index `0..NUM_BINS`.
///
/// Starting at bin 0, the size is halved until it drops to
/// [`BIN_THRESHOLD`] or the last bin is reached, whichever comes first.
pub(crate) const fn bin_of(size: usize) -> usize {
    let mut k = 0;
    let mut c = size;
    while c > BIN_THRESHOLD && k < NUM_BINS - 1 {
        c >>= 1;
        k += 1;
    }
    k
}

#[inline]
unsafe fn read_ptr(addr: *mut u8) -> *mut u8 {
    unsafe { addr.cast::<*mut u8>().read() }
}

#[inline]
unsafe fn write_ptr(addr: *mut u8, value: *mut u8) {
    unsafe { addr.cast::<*mut u8>().write(value) }
}

#[inline]
unsafe fn get_prev(bp: *mut u8) -> *mut u8 {
    unsafe { read_ptr(bp) }
}

#[inline]
unsafe fn get_next(bp: *mut u8) -> *mut u8 {
    unsafe { read_ptr(bp.add(WORD)) }
}

/// Next block chained after `bp` within its bin's list.
///
/// # Safety
/// `bp` must currently be linked into some bin.
pub(crate) unsafe fn next(bp: *mut u8) -> *mut u8 {
    unsafe { get_next(bp) }
}

#[inline]
unsafe fn set_prev(bp: *mut u8, value: *mut u8) {
    unsafe { write_ptr(bp, value) }
}

#[inline]
unsafe fn set_next(bp: *mut u8, value: *mut u8) {
    unsafe { write_ptr(bp.add(WORD), value) }
}

/// Insert free block `bp` (of the given `size`) at the head of its bin.
///
/// # Safety
/// `bp` must be a free block of `size` bytes, not currently on any bin list.
pub(crate) unsafe fn list_insert(bins: &mut Bins, bp: *mut u8, size: usize) {
    let k = bin_of(size);
    unsafe {
        set_prev(bp, core::ptr::null_mut());
        set_next(bp, bins[k]);
        if !bins[k].is_null() {
            set_prev(bins[k], bp);
        }
    }
    bins[k] = bp;
}

/// Remove free block `bp` (of the given `size`) from its bin.
///
/// # Safety
/// `bp` must currently be linked into the bin that `bin_of(size)` names.
pub(crate) unsafe fn list_remove(bins: &mut Bins, bp: *mut u8, size: usize) {
    let k = bin_of(size);
    unsafe {
        let prev = get_prev(bp);
        let next = get_next(bp);
        if prev.is_null() {
            bins[k] = next;
        } else {
            set_next(prev, next);
        }
        if !next.is_null() {
            set_prev(next, prev);
        }
    }
}

/// Iterate the blocks chained into bin `k`, head to tail.
///
/// # Safety
/// The bin table must describe a heap that is still live; the closure must
/// not mutate the list it is walking.
pub(crate) unsafe fn for_each_in_bin(bins: &Bins, k: usize, mut f: impl FnMut(*mut u8)) {
    let mut cur = bins[k];
    while !cur.is_null() {
        f(cur);
        cur = unsafe { get_next(cur) };
    }
}
